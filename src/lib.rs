/*!
Logic layer for the school portal: which user fields each role may see or
edit, and how the backend's differently-shaped list payloads get flattened
before the portal renders them.
*/
pub mod config;
pub mod normalize;
pub mod roles;
pub mod visibility;

pub use roles::Role;

/// Starts logging to stderr. Stdout belongs to the response stream.
pub fn init_logging(level: simplelog::LevelFilter) -> anyhow::Result<()> {
    use simplelog::{ColorChoice, TermLogger, TerminalMode};

    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("portald")
        .build();
    TermLogger::init(level, log_cfg, TerminalMode::Stderr, ColorChoice::Never)?;
    Ok(())
}
