use anyhow::Result;
use clap::Parser;
use haunted_house::{app::App, cli::Cli};
use winit::event_loop::EventLoop;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    log::info!("Haunted House - Controls: drag to orbit, right drag to pan, wheel to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
