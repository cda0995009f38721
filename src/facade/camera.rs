use cgmath::{
    Deg,
    Matrix4,
    Point3,
    Rad,
    SquareMatrix,
    Vector3
};

use winit::event;

use crate::mesh::Bounds;

/// Orbits `target` at `distance`, starting on the +Z axis.
pub(super) struct Camera {
    target: Point3<f32>,
    distance: f32,
    framing_distance: f32,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    aspect: f32
}

impl Camera {
    const FOV: f32 = 45.0;

    // Keep the eye off the poles so look_at_rh never sees a parallel up vector
    const PITCH_LIMIT: f32 = 1.5;

    const MATRIX_CORRECTION_FOR_WGPU: Matrix4<f32> = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.0,
        0.0, 0.0, 0.5, 1.0,
    );

    pub(super) fn framing(bounds: Option<Bounds>, aspect: f32) -> Self {
        let (target, radius) = match bounds {
            Some(bounds) => (Point3::from(bounds.center()), bounds.radius().max(0.01)),
            None => (Point3::new(0f32, 0f32, 0f32), 1f32)
        };

        // Fit the bounding sphere in the vertical field of view, with a margin
        let half_fov = Rad::from(Deg(Self::FOV * 0.5)).0;
        let distance = radius / half_fov.sin() * 1.1;

        Self {
            target,
            distance,
            framing_distance: distance,
            yaw: Rad(0f32),
            pitch: Rad(0f32),
            aspect
        }
    }

    pub(super) fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub(super) fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw = Rad(self.yaw.0 + yaw);
        self.pitch = Rad((self.pitch.0 + pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT));
    }

    /// Positive deltas move the eye closer
    pub(super) fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1f32 - delta)).clamp(
            self.framing_distance * 0.2f32,
            self.framing_distance * 5f32
        );
    }

    pub(super) fn eye(&self) -> Point3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();

        self.target + Vector3::new(
            pitch_cos * yaw_sin,
            pitch_sin,
            pitch_cos * yaw_cos
        ) * self.distance
    }

    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y());

        let projection = cgmath::perspective(
            Deg(Self::FOV),
            self.aspect,
            self.distance * 0.01,
            self.distance * 10.0
        );

        Self::MATRIX_CORRECTION_FOR_WGPU * projection * view
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct SceneUniform {
    projection: [[f32; 4]; 4],
    eye: [f32; 4],
    // x: 1.0 when the headlight is on
    lighting: [f32; 4]
}

impl SceneUniform {
    pub(super) fn new(default_lighting: bool) -> Self {
        Self {
            projection: Matrix4::identity().into(),
            eye: [0f32; 4],
            lighting: [if default_lighting { 1f32 } else { 0f32 }, 0f32, 0f32, 0f32]
        }
    }

    pub(super) fn update_projection(&mut self, camera: &Camera) {
        self.projection = camera.build_view_projection_matrix().into();

        let eye = camera.eye();
        self.eye = [eye.x, eye.y, eye.z, 1f32];
    }
}

pub(super) struct CameraController {
    enabled: bool,
    mouse_position: Option<winit::dpi::PhysicalPosition<f64>>,
    toggle: bool
}

impl CameraController {
    // Radians per pixel of drag
    const SENSITIVITY: f32 = 0.01;

    pub(super) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            mouse_position: None,
            toggle: false
        }
    }

    /// Returns true when the event moved the camera
    pub(super) fn handle_mouse_events(&mut self, camera: &mut Camera, event: &event::WindowEvent) -> bool {
        if !self.enabled {
            return false;
        }

        use event::WindowEvent::*;
        match event {
            MouseWheel { delta, .. } => {
                let lines = match delta {
                    event::MouseScrollDelta::LineDelta(.., lines) => *lines,
                    event::MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20f32
                };

                camera.zoom(lines * 0.1f32);
                true
            },
            CursorMoved { position, .. } => {
                let previous = self.mouse_position.replace(*position);

                match previous {
                    Some(previous) if self.toggle => {
                        let dx = (position.x - previous.x) as f32;
                        let dy = (position.y - previous.y) as f32;

                        // Dragging right swings the eye left around the target
                        camera.orbit(-dx * Self::SENSITIVITY, dy * Self::SENSITIVITY);
                        true
                    },
                    _ => false
                }
            },
            MouseInput {
                state,
                button: event::MouseButton::Left,
                ..
            } => {
                self.toggle = *state == event::ElementState::Pressed;
                true
            },
            _ => false
        }
    }
}
