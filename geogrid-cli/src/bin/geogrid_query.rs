//! Value queries against gridded earth models.

use std::io::Write;
use std::panic;

use clap::{value_parser, Arg, Command};
use log::{error, info, warn};

use geogrid::prelude::Query;
use geogrid_cli::{common_args, output_writer, points_reader, read_points, Error};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    env_logger::init();
    match panic::catch_unwind(execute) {
        Ok(Ok(())) => 0,
        Ok(Err(error)) => {
            error!("{}", error);
            1
        },
        Err(_) => {
            error!("caught unknown panic");
            2
        },
    }
}

fn execute() -> Result<(), Error> {
    let matches = common_args(
        Command::new("geogrid-query")
            .about("Value queries against gridded earth models")
            .arg(
                Arg::new("values")
                    .short('v')
                    .long("values")
                    .required(true)
                    .value_delimiter(',')
                    .help("Value names to return, in output order"),
            )
            .arg(
                Arg::new("squash-min-elev")
                    .long("squash-min-elev")
                    .value_parser(value_parser!(f64))
                    .help("Fold topography out of z above this elevation (m)"),
            ),
    )
    .get_matches();

    let models: Vec<String> = matches
        .get_many::<String>("models")
        .expect("--models is required")
        .cloned()
        .collect();
    let value_names: Vec<String> = matches
        .get_many::<String>("values")
        .expect("--values is required")
        .cloned()
        .collect();
    let input_crs = matches
        .get_one::<String>("input-crs")
        .expect("--input-crs has a default");
    let points_path = matches
        .get_one::<String>("points")
        .expect("--points is required");

    let mut query = Query::new();
    if let Some(cutoff) = matches.get_one::<f64>("squash-min-elev") {
        query.set_squash_min_elev(*cutoff);
        info!("squashing enabled above {} m", cutoff);
    }
    query.initialize(&models, &value_names, input_crs)?;
    info!("{} model(s) ready, input CRS \"{}\"", query.num_models(), input_crs);

    let points = read_points(points_reader(points_path)?)?;
    info!("{} point(s) to process", points.len());

    let mut output = output_writer(matches.get_one::<String>("output"))?;
    let columns: Vec<String> = value_names
        .iter()
        .zip(query.value_units().iter())
        .map(|(name, unit)| format!("{}({})", name, unit))
        .collect();
    writeln!(output, "# x y z {}", columns.join(" "))?;

    let mut misses = 0_usize;
    let mut values = vec![0.0_f64; value_names.len()];
    for [x, y, z] in points {
        if !query.query(&mut values, x, y, z)? {
            misses += 1;
        }
        write!(output, "{:.6} {:.6} {:.6}", x, y, z)?;
        for value in &values {
            write!(output, " {:.6e}", value)?;
        }
        writeln!(output)?;
    }
    output.flush()?;

    if misses > 0 {
        warn!("{} point(s) outside every model", misses);
    }

    query.finalize();
    Ok(())
}
