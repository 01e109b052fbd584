//! Ground surface elevation queries against gridded earth models.

use std::io::Write;
use std::panic;

use clap::Command;
use log::{error, info};

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
        Command::new("geogrid-elev")
            .about("Ground surface elevation queries against gridded earth models"),
    )
    .get_matches();

    let models: Vec<String> = matches
        .get_many::<String>("models")
        .expect("--models is required")
        .cloned()
        .collect();
    let input_crs = matches
        .get_one::<String>("input-crs")
        .expect("--input-crs has a default");
    let points_path = matches
        .get_one::<String>("points")
        .expect("--points is required");

    let value_names: Vec<String> = Vec::new();
    let mut query = Query::new();
    query.initialize(&models, &value_names, input_crs)?;
    info!("{} model(s) ready, input CRS \"{}\"", query.num_models(), input_crs);

    let points = read_points(points_reader(points_path)?)?;
    info!("{} point(s) to process", points.len());

    let mut output = output_writer(matches.get_one::<String>("output"))?;
    writeln!(output, "# x y elevation(m)")?;
    for [x, y, _] in points {
        let elevation = query.query_elevation(x, y)?;
        writeln!(output, "{:.6} {:.6} {:.6e}", x, y, elevation)?;
    }
    output.flush()?;

    query.finalize();
    Ok(())
}
