/// Demo application
/// Opens a window and renders a field of lit, textured, rotating cubes
use anyhow::Context as _;
use glam::Vec3;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use noise::{NoiseFn, Perlin};
use scanline_renderer::rendering::geometry::Cube;
use scanline_renderer::*;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

const TEXTURE_SIZE: usize = 128;
const CUBE_GRID: i32 = 5;
const CUBE_SPACING: f32 = 2.5;
const SKY: Color = Color::new(40, 60, 90);

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
    log::debug!("logging initialized");
}

/// Marble-ish texture from two octaves of Perlin noise.
fn noise_texture(seed: u32) -> PixelSurface {
    let perlin = Perlin::new(seed);
    let scale = 8.0 / TEXTURE_SIZE as f64;
    PixelSurface::from_fn(TEXTURE_SIZE, TEXTURE_SIZE, |x, y| {
        let (fx, fy) = (x as f64 * scale, y as f64 * scale);
        let n = perlin.get([fx, fy]) * 0.7 + perlin.get([fx * 4.0, fy * 4.0]) * 0.3;
        let t = ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
        Color::new(
            (90.0 + 140.0 * t) as u8,
            (70.0 + 120.0 * t) as u8,
            (50.0 + 60.0 * t) as u8,
        )
    })
}

fn cube_field(time: f32) -> Vec<Cube> {
    let half = (CUBE_GRID - 1) as f32 * 0.5;
    let mut cubes = Vec::with_capacity((CUBE_GRID * CUBE_GRID) as usize);
    for gz in 0..CUBE_GRID {
        for gx in 0..CUBE_GRID {
            let phase = (gx * CUBE_GRID + gz) as f32 * 0.37;
            cubes.push(Cube {
                size: 1.0,
                rotation: Vec3::new(time * 0.5 + phase, time * 0.8 + phase, 0.0),
                center: Vec3::new(
                    (gx as f32 - half) * CUBE_SPACING,
                    0.0,
                    gz as f32 * CUBE_SPACING + 3.0,
                ),
            });
        }
    }
    cubes
}

fn render_frame(
    window: &Window,
    surface: &mut softbuffer::Surface<Arc<Window>, Arc<Window>>,
    renderer: &mut Renderer<FpsCamera>,
    texture: &PixelSurface,
    time: f32,
) -> anyhow::Result<DrawStats> {
    let size = window.inner_size();
    let (Some(nz_width), Some(nz_height)) =
        (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
    else {
        // Minimized.
        return Ok(DrawStats::default());
    };
    surface
        .resize(nz_width, nz_height)
        .map_err(|e| anyhow::anyhow!("failed to resize window buffer: {e}"))?;

    let mut buffer = surface
        .buffer_mut()
        .map_err(|e| anyhow::anyhow!("failed to acquire window buffer: {e}"))?;
    let (width, height) = (size.width as usize, size.height as usize);

    if renderer.depth_buffer().width() != width || renderer.depth_buffer().height() != height {
        renderer.set_z_buffer_size(width, height);
    }
    renderer.clear_z_buffer();

    let mut stats = DrawStats::default();
    {
        let mut view = SurfaceView::packed(&mut buffer, width, height)?;
        view.fill(SKY);

        let indices = Cube::attributed_indices();
        for cube in cube_field(time) {
            stats += renderer.draw_mapped_triangles_3d(
                &mut view,
                &cube.attributed_vertices(),
                &indices,
                texture,
            );
        }
    }

    buffer
        .present()
        .map_err(|e| anyhow::anyhow!("failed to present frame: {e}"))?;
    Ok(stats)
}

fn main() -> anyhow::Result<()> {
    init_logging();
    log::info!("=== Scanline Renderer ===");
    log::info!("Controls: WASD move, Space/Shift up/down, click + mouse to look");
    log::info!("          Tab wireframe, C back-face culling, ESC release mouse / exit");

    let event_loop = EventLoop::new().context("creating event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Scanline Renderer")
            .with_inner_size(winit::dpi::LogicalSize::new(960, 540))
            .build(&event_loop)
            .context("creating window")?,
    );

    let context = softbuffer::Context::new(window.clone())
        .map_err(|e| anyhow::anyhow!("creating softbuffer context: {e}"))?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())
        .map_err(|e| anyhow::anyhow!("creating softbuffer surface: {e}"))?;

    let texture = noise_texture(12345);
    let mut renderer = Renderer::new(FpsCamera::new(Vec3::new(0.0, 1.5, -4.0)));
    renderer.camera_mut().pitch = 12.0;
    let mut camera_controller = CameraController::new();

    let start = Instant::now();
    let mut last_frame = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    let mut mouse_captured = false;
    let mut last_mouse_pos: Option<(f64, f64)> = None;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;

                    if let PhysicalKey::Code(keycode) = event.physical_key {
                        match keycode {
                            KeyCode::KeyW => camera_controller.forward_pressed = pressed,
                            KeyCode::KeyS => camera_controller.backward_pressed = pressed,
                            KeyCode::KeyA => camera_controller.left_pressed = pressed,
                            KeyCode::KeyD => camera_controller.right_pressed = pressed,
                            KeyCode::Space => camera_controller.up_pressed = pressed,
                            KeyCode::ShiftLeft => camera_controller.down_pressed = pressed,
                            KeyCode::Tab if pressed => {
                                let config = renderer.config_mut();
                                config.wireframe = !config.wireframe;
                                log::info!("Wireframe: {}", if config.wireframe { "ON" } else { "OFF" });
                            }
                            KeyCode::KeyC if pressed => {
                                let config = renderer.config_mut();
                                config.backface_culling = !config.backface_culling;
                                log::info!(
                                    "Back-face culling: {}",
                                    if config.backface_culling { "ON" } else { "OFF" }
                                );
                            }
                            KeyCode::Escape if pressed => {
                                if mouse_captured {
                                    mouse_captured = false;
                                    last_mouse_pos = None;
                                    window.set_cursor_visible(true);
                                } else {
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if button == MouseButton::Left && state == ElementState::Pressed {
                        mouse_captured = true;
                        window.set_cursor_visible(false);
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if mouse_captured {
                        if let Some(last_pos) = last_mouse_pos {
                            let delta_x = position.x - last_pos.0;
                            let delta_y = position.y - last_pos.1;
                            renderer.camera_mut().rotate(delta_x as f32, delta_y as f32);
                        }
                        last_mouse_pos = Some((position.x, position.y));
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    camera_controller.update_camera(renderer.camera_mut(), dt);

                    let stats = match render_frame(
                        &window,
                        &mut surface,
                        &mut renderer,
                        &texture,
                        start.elapsed().as_secs_f32(),
                    ) {
                        Ok(stats) => stats,
                        Err(e) => {
                            log::error!("{e:#}");
                            elwt.exit();
                            return;
                        }
                    };

                    frame_count += 1;
                    if fps_timer.elapsed().as_secs() >= 1 {
                        log::info!(
                            "FPS: {} | polygons: {} | culled: {} | pixels: {}",
                            frame_count,
                            stats.polygons_drawn,
                            stats.triangles_culled,
                            stats.pixels_written
                        );
                        if cfg!(feature = "profiling") {
                            FUNCTION_COUNTERS.snapshot().log_report();
                            FUNCTION_COUNTERS.reset();
                        }
                        frame_count = 0;
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    })?;

    Ok(())
}
