//! SDL2 window, input translation and frame pacing.
//!
//! Only compiled with the `window` feature.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::camera::{Direction, MoveKeys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
}

/// Input gathered between two frames.
///
/// Key state persists across frames; mouse motion is accumulated per frame
/// and cleared at the start of each poll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub keys: MoveKeys,
    pub mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one SDL event into the state. Returns the window-level event it
    /// represents, if any.
    pub fn handle(&mut self, event: &Event) -> WindowEvent {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => return WindowEvent::Quit,
            Event::Window {
                win_event: sdl2::event::WindowEvent::Resized(w, h),
                ..
            } => return WindowEvent::Resize(*w as u32, *h as u32),
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => {
                if let Some(direction) = direction_for(*key) {
                    self.keys.press(direction);
                }
            }
            Event::KeyUp {
                keycode: Some(key), ..
            } => {
                if let Some(direction) = direction_for(*key) {
                    self.keys.release(direction);
                }
            }
            Event::MouseMotion { xrel, yrel, .. } => {
                self.mouse_delta.0 += *xrel as f32;
                self.mouse_delta.1 += *yrel as f32;
            }
            _ => {}
        }
        WindowEvent::None
    }
}

fn direction_for(key: Keycode) -> Option<Direction> {
    match key {
        Keycode::W | Keycode::Up => Some(Direction::Forward),
        Keycode::S | Keycode::Down => Some(Direction::Back),
        Keycode::A | Keycode::Left => Some(Direction::Left),
        Keycode::D | Keycode::Right => Some(Direction::Right),
        _ => None,
    }
}

pub struct FrameLimiter {
    previous_frame_time: u64,
    /// Milliseconds per frame; 0 means uncapped.
    frame_target_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, target_fps: u32) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
            frame_target_time: if target_fps == 0 {
                0
            } else {
                1000 / u64::from(target_fps)
            },
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    /// Delta time represents the time elapsed since the last call to this method.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < self.frame_target_time {
            let time_to_wait = self.frame_target_time - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Declared before `texture_creator` so it is dropped first.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    /// Open a resizable window with the pointer captured in relative mode.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;
        sdl_context.mouse().set_relative_mouse_mode(true);

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // The texture is dropped before it by struct field order.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Drain pending events into `input`.
    ///
    /// Quit wins over resize; of several resizes the last one is reported.
    pub fn poll_events(&mut self, input: &mut InputState) -> WindowEvent {
        input.mouse_delta = (0.0, 0.0);
        let mut result = WindowEvent::None;
        for event in self.event_pump.poll_iter() {
            match input.handle(&event) {
                WindowEvent::Quit => result = WindowEvent::Quit,
                resize @ WindowEvent::Resize(..) if result != WindowEvent::Quit => result = resize,
                _ => {}
            }
        }
        result
    }

    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        // SAFETY: Same as in new() - texture_creator outlives texture
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
