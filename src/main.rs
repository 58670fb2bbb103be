use climate_globe::{Dataset, GlobeError, Viewer};
use env_logger::Env;

fn main() -> Result<(), GlobeError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let dataset = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading dataset from {}", path);
            Dataset::load(&path)?
        }
        None => Dataset::reference(),
    };

    Viewer::new().with_dataset(dataset).run()
}
