mod facade;
mod mesh;

fn main() {
    env_logger::init();

    let mesh = match mesh::Mesh::triangle() {
        Ok(mesh) => mesh,
        Err(e) => {
            log::error!("could not build mesh: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pollster::block_on(
        facade::run(mesh, facade::ViewConfig::default())
    ) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
