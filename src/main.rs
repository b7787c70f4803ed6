use beamprop::{
    console::{Args, PartialArgs},
    error::BpResult,
    plottable::{BeamPlot, PlotOptions},
    propagation::BeamPropagation,
    setup::BeamSetup,
};
use clap::Parser;
use env_logger::Env;
use std::io::{self, Write};
use std::path::Path;

fn read_and_build_setup(path: &Path) -> BpResult<(BeamSetup, BeamPropagation)> {
    print!("\nReading setup...");
    let _ = io::stdout().flush();
    let setup = BeamSetup::from_file(path)?;
    let propagation = setup.build()?;
    println!("Success");
    Ok((setup, propagation))
}

fn main() -> BpResult<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    //parse CLI arguments
    let beamprop_args = Args::try_from(PartialArgs::parse())?;

    //read the setup and derive the beam segments
    let (setup, propagation) = read_and_build_setup(&beamprop_args.file_path)?;
    for (i, segment) in propagation.segments().iter().enumerate() {
        println!("Segment {i}: {segment}");
    }

    //sample the beam and render the plot
    let options = PlotOptions {
        backend: beamprop_args.backend(),
        ..setup.plot_options().clone()
    };
    let plot = BeamPlot::from_propagation(&propagation, &options)?;
    print!("Write plot to {}...", beamprop_args.output.display());
    let _ = io::stdout().flush();
    plot.render(&options, &beamprop_args.output)?;
    println!("Success");
    Ok(())
}
