use anyhow::Result;

use ripple_engine::device::GpuInit;
use ripple_engine::engine::{SimConfig, Simulation};
use ripple_engine::logging::{LoggingConfig, init_logging};
use ripple_engine::pipeline::ShaderSources;
use ripple_engine::window::{Runtime, RuntimeConfig};

fn bundled_simulation() -> Simulation {
    Simulation {
        shaders: ShaderSources {
            compute: include_str!("shaders/compute.wgsl").to_owned(),
            vertex: include_str!("shaders/vertex.wgsl").to_owned(),
            fragment: include_str!("shaders/fragment.wgsl").to_owned(),
        },
        config: SimConfig::default(),
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("starting the trail-field viewer");

    Runtime::run(
        RuntimeConfig {
            title: "ripple viewer".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        bundled_simulation(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_artifacts_satisfy_the_binding_contract() {
        bundled_simulation().validate().unwrap();
    }
}
