#[derive(Clone, Debug)]
pub(crate) struct ViewConfig {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) background: wgpu::Color,
    pub(crate) default_lighting: bool,
    pub(crate) camera_control: bool
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: String::from("rawmesh"),
            width: 320,
            height: 320,
            background: wgpu::Color { r: 0.5, g: 0.5, b: 0.5, a: 1.0 },
            default_lighting: true,
            camera_control: true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_a_small_gray_lit_window() {
        let view = ViewConfig::default();

        assert_eq!((view.width, view.height), (320, 320));
        assert_eq!(view.background, wgpu::Color { r: 0.5, g: 0.5, b: 0.5, a: 1.0 });
        assert!(view.default_lighting);
        assert!(view.camera_control);
        assert_eq!(view.title, "rawmesh");
    }
}
