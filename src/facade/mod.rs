mod camera;
mod config;
mod error;
mod state;

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder
};

use crate::mesh::Mesh;

pub(crate) use config::ViewConfig;
pub(crate) use error::RenderError;

/// Opens a window showing `mesh` and hands control to the event loop.
/// Only returns if setup fails.
pub(crate) async fn run(mesh: Mesh, view: ViewConfig) -> Result<(), RenderError> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(view.title.as_str())
        .with_inner_size(LogicalSize::new(view.width, view.height))
        .build(&event_loop)?;

    let mut state = state::State::new(&window, &mesh, &view).await?;

    // GPU buffers hold their own copy from here on
    drop(mesh);

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                state.update();

                match state.render() {
                    Ok(..) => {  },
                    Err(wgpu::SurfaceError::Lost) => state.redraw(),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface is out of memory, exiting");
                        *control_flow = ControlFlow::Exit
                    },
                    Err(e) => log::warn!("{:?}", e)
                }
            },
            Event::MainEventsCleared => {
                window.request_redraw();
            },
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => if !state.input(event) {
                match event {
                    // Handle close behavior
                    WindowEvent::CloseRequested | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,

                    // Resizing
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size)
                    },

                    // Adjust inner size
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        state.resize(**new_inner_size)
                    },
                    _ => {}
                }
            },
            _ => {}
        }
    });
}
