//! Asteroid Fracture diagnostic entry point
//!
//! Builds one jagged rock, generates its crack layers and the fragments it
//! would split into, and prints everything as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::fs;

    use glam::Vec2;
    use serde::Serialize;

    use asteroid_fracture::consts::{LARGE_RADIUS, MEDIUM_RADIUS, OUTLINE_ROUGHNESS, SMALL_RADIUS};
    use asteroid_fracture::sim::{
        CrackLayer, CrackReveal, FragmentDescriptor, FragmentRequest, PolygonGeometry, SizeClass,
        crack_seed, fragment_variant, generate_crack_layers,
    };
    use asteroid_fracture::{DetailLevel, Registry};

    const USAGE: &str = "usage: asteroid-fracture [--config FILE] [--seed N] [--variant KEY] \
                         [--sides N] [--radius R] [--size large|medium|small] [--detail low|medium|high]";

    struct Options {
        config: Option<String>,
        seed: u64,
        variant: String,
        sides: usize,
        radius: Option<f32>,
        size: SizeClass,
        detail: DetailLevel,
    }

    impl Default for Options {
        fn default() -> Self {
            Self {
                config: None,
                seed: crack_seed(1, 1, 0),
                variant: "standard".to_string(),
                sides: 11,
                radius: None,
                size: SizeClass::Large,
                detail: DetailLevel::default(),
            }
        }
    }

    fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
        let mut opts = Options::default();
        let mut args = args;
        while let Some(flag) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "--config" => opts.config = Some(value()?),
                "--seed" => opts.seed = value()?.parse().map_err(|e| format!("--seed: {e}"))?,
                "--variant" => opts.variant = value()?,
                "--sides" => opts.sides = value()?.parse().map_err(|e| format!("--sides: {e}"))?,
                "--radius" => {
                    opts.radius = Some(value()?.parse().map_err(|e| format!("--radius: {e}"))?)
                }
                "--size" => {
                    let raw = value()?;
                    opts.size = SizeClass::from_str(&raw).ok_or(format!("unknown size \"{raw}\""))?;
                }
                "--detail" => {
                    let raw = value()?;
                    opts.detail =
                        DetailLevel::from_str(&raw).ok_or(format!("unknown detail \"{raw}\""))?;
                }
                "-h" | "--help" => return Err(USAGE.to_string()),
                other => return Err(format!("unknown argument \"{other}\"\n{USAGE}")),
            }
        }
        Ok(opts)
    }

    #[derive(Serialize)]
    struct Report<'a> {
        seed: u64,
        variant: &'a str,
        profile: &'a str,
        rules: &'a str,
        size: SizeClass,
        detail: &'static str,
        outline: &'a [Vec2],
        min_surface_radius: f32,
        /// Health fraction at which each stage shows
        reveal_thresholds: [f32; 3],
        layers: &'a [CrackLayer],
        fragments: &'a [FragmentDescriptor],
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let opts = parse_args(std::env::args().skip(1))?;

        let registry = match &opts.config {
            Some(path) => {
                log::info!("loading tables from {path}");
                Registry::from_json(&fs::read_to_string(path)?)?
            }
            None => Registry::builtin(),
        };

        let radius = opts.radius.unwrap_or(match opts.size {
            SizeClass::Large => LARGE_RADIUS,
            SizeClass::Medium => MEDIUM_RADIUS,
            SizeClass::Small => SMALL_RADIUS,
        });
        let geometry = PolygonGeometry::jagged(opts.seed, opts.sides, radius, OUTLINE_ROUGHNESS);
        log::info!(
            "rock: {} vertices, nominal radius {:.1}, min surface radius {:.1}",
            geometry.vertices().len(),
            geometry.nominal_radius(),
            geometry.min_surface_radius()
        );

        let layers = generate_crack_layers(&geometry, opts.seed, &opts.variant, &registry, opts.detail);
        let profile = registry.profile_for(&opts.variant);

        // Drive the reveal tracker to zero health so every layer is listed
        let mut reveal = CrackReveal::new(profile);
        for stage in reveal.update(0.0) {
            let layer = &layers[stage as usize - 1];
            log::info!("stage {stage}: {} segments", layer.segments.len());
        }

        let request = FragmentRequest {
            parent_id: 1,
            size: opts.size,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius,
            generation: 0,
            wave: 1,
            crack_seed: opts.seed,
        };
        let fragments = fragment_variant(&request, &registry, &opts.variant);

        let report = Report {
            seed: opts.seed,
            variant: &opts.variant,
            profile: registry.profile_key(&opts.variant),
            rules: registry.rules_key(&opts.variant),
            size: opts.size,
            detail: opts.detail.as_str(),
            outline: geometry.vertices(),
            min_surface_radius: geometry.min_surface_radius(),
            reveal_thresholds: profile.reveal_thresholds,
            layers: reveal.revealed_layers(&layers),
            fragments: &fragments,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Asteroid Fracture (native) starting...");

    if let Err(e) = cli::run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; hosts call the generators directly
}
