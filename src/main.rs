use clap::Parser;
use inquire::Confirm;
use log::{error, info, warn};
use std::process::ExitCode;

use labelkit::config::{KittiArgs, LabelmeArgs, RemapArgs, RenameArgs};
use labelkit::{
    batch_convert_kitti, batch_remap, convert_splits, rename_images, Cli, Command, Error, Result,
};

fn run_labelme(args: &LabelmeArgs) -> Result<()> {
    let class_map = args.class_map();
    let reports = convert_splits(
        &args.json_dir,
        &args.output_dir,
        &args.split_names(),
        &class_map,
    )?;
    for (split, report) in reports {
        if !split.is_empty() {
            info!("Split '{}':", split);
        }
        report.print_summary();
    }
    Ok(())
}

fn run_kitti(args: &KittiArgs) -> Result<()> {
    let report = batch_convert_kitti(
        &args.labels_dir,
        &args.images_dir,
        &args.output_dir,
        &args.options(),
    )?;
    report.print_summary();
    Ok(())
}

fn run_remap(args: &RemapArgs) -> Result<()> {
    let report = batch_remap(&args.input_dir, &args.output_dir, &args.id_remap())?;
    report.print_summary();
    Ok(())
}

fn confirm_rename(args: &RenameArgs) -> Result<()> {
    warn!("************ WARNING ************");
    warn!("Files in this directory will be renamed IRREVERSIBLY:");
    warn!("Directory: {}", args.image_dir.display());
    warn!("New names: {}_XXXXX.ext", args.prefix);
    warn!("Make a backup if you are not sure.");

    if args.yes {
        return Ok(());
    }

    let confirmed = Confirm::new("Do you want to continue?")
        .with_default(false)
        .prompt()?;
    if confirmed {
        info!("Confirmation received. Renaming...");
        Ok(())
    } else {
        Err(Error::Cancelled)
    }
}

fn run_rename(args: &RenameArgs) -> Result<()> {
    confirm_rename(args)?;
    let report = rename_images(&args.image_dir, &args.prefix)?;
    report.print_summary();
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Labelme(args) => run_labelme(args),
        Command::Kitti(args) => run_kitti(args),
        Command::Remap(args) => run_remap(args),
        Command::Rename(args) => run_rename(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Cancelled) => {
            info!("Operation cancelled by user.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
