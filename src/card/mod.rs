/// Greeting card module
///
/// - Scroll/tap to reveal state machine (reveal.rs)
/// - Typewriter effect for the message (typewriter.rs)

pub mod reveal;
pub mod typewriter;
