use clap::Args;
use isivol::VolumeLayout;

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Volume name
    pub name: String,
}

pub fn execute(args: PathArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    VolumeLayout::validate_name(&args.name)?;
    let options = global.load_options()?;
    println!("{}", options.layout().mountpoint(&args.name).display());
    Ok(())
}
