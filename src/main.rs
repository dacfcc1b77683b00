use log::info;
use softscene::prelude::*;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading scene from {}", path);
            AppConfig::load(&path).map_err(|e| e.to_string())?
        }
        None => AppConfig::default(),
    };

    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)?;
    let mut engine = Engine::from_config(&config).map_err(|e| e.to_string())?;
    let mut input = InputState::new();
    let mut frame_limiter = FrameLimiter::new(&window, config.window.target_fps);

    loop {
        match window.poll_events(&mut input) {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) => {
                window.resize(w, h)?;
                engine.resize(w, h);
            }
            WindowEvent::None => {}
        }

        let delta_time = frame_limiter.wait_and_get_delta(&window);
        engine.update(&input.keys, input.mouse_delta, delta_time as f32);
        engine.render().map_err(|e| e.to_string())?;
        window.present(engine.frame_buffer())?;
    }

    info!("shutting down");
    Ok(())
}
