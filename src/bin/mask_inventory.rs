//! Apply the country mask to the prepared emission fluxes.
//!
//! Crops the inventory to a window covering China, builds (or reloads)
//! the country mask from the province shapefile, and NaNs everything
//! outside. HCl keeps Taiwan in the mask, pCl excludes it.
//!
//! Run with: cargo run --bin mask_inventory --features netcdf [data root]

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::batch::run_batch;
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::grid::Dataset;
    use clpost_rs::inventory::Species;
    use clpost_rs::io::{self, BoundarySet, NetCDFWriterConfig};
    use clpost_rs::regions::{RegionMask, boxes};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Country masking");
    println!("===============");

    let shapefile = config.emissions_root().join("china_provinces.shp");
    let boundaries = match BoundarySet::load(&shapefile) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("failed to load {}: {}", shapefile.display(), e);
            std::process::exit(1);
        }
    };
    println!("{}", boundaries.statistics());

    let report = run_batch(&Species::BOTH, |&species| -> Result<(), Box<dyn std::error::Error>> {
        let flux_path = config.output_path(&format!("{}_flux.nc", species.prefix()));
        println!("\n{}:", species);
        println!("  reading {}", flux_path.display());
        let cropped = io::read_dataset(&flux_path)?.crop(&boxes::CHINA_WINDOW)?;

        let mask = RegionMask::cached(
            config.output_path(species.mask_cache_name()),
            &cropped.grid,
            || {
                if species.mask_includes_taiwan() {
                    boundaries.union()
                } else {
                    boundaries.union_excluding(&["Taiwan"])
                }
            },
        )?;
        println!("  {}", mask.statistics());

        let mut masked =
            Dataset::new(cropped.grid.clone()).with_time(cropped.time.clone());
        for field in cropped.fields() {
            masked.push_field(mask.apply(field)?)?;
        }

        let out_path = config.output_path(&format!("{}_flux_masked.nc", species.prefix()));
        let writer = NetCDFWriterConfig::new(out_path.to_string_lossy())
            .with_title(format!("{} emission flux, country-masked", species));
        io::write_dataset(&writer, &masked)?;
        println!("  wrote {}", out_path.display());
        Ok(())
    });

    println!("\nDone: {}", report);
    if report.all_failed() {
        std::process::exit(1);
    }
}

#[cfg(not(feature = "netcdf"))]
fn main() {
    eprintln!("This tool requires the 'netcdf' feature.");
    eprintln!("Run with: cargo run --bin mask_inventory --features netcdf");
}
