pub mod gemini;

pub use gemini::GeminiModel;
