use hyprviz::ConfigArgs;

use log::LevelFilter;
use std::io::Write;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} - mod path |{}| - target | {} | args: |{}|",
                record.level(),
                record.module_path().unwrap_or(""),
                record.target(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Warn)
        .filter_module("hyprviz", LevelFilter::Info)
        .filter_module("hyprviz_engine", LevelFilter::Info)
        .filter_module("hyprviz_ui", LevelFilter::Info)
        .parse_default_env()
        .init();

    // Positional CLI arguments: [SOCKET_PATH] [SHADER_PATH]
    let args = ConfigArgs::from_env();
    let config = hyprviz::load_config(&args)?;
    let shader = args.shader_source();

    let engine = hyprviz::start(config)?;

    // Run UI on main thread (blocking)
    let ui_result = hyprviz_ui::run(engine.store(), engine.events(), engine.commands(), shader);

    // UI has exited - stop the engine and wait for its thread
    engine.stop()?;
    ui_result
}
