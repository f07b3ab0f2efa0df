// ABOUTME: Version info, REPL banner, and prompt constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "nimble";
pub const WELCOME_SUBTITLE: &str = "a small tree-walking scripting language";
pub const REPL_PROMPT: &str = "nimble% ";

pub const HELP_TEXT: &str = r#"
nimble REPL.

Enter statements or a single expression to evaluate it. Ctrl-D exits.
Scripts end in .nbl or .nimble: `nimble path/to/script.nbl`.
"#;
