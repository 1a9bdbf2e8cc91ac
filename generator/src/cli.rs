use std::path::PathBuf;

use clap::Parser;
use xb_generator::Generator;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "The schema file")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value = "python")]
    pub generator: Generator,

    #[arg(long, default_value = ".", help = "Directory the generated file is written to")]
    pub output_dir: PathBuf,

    #[arg(long, help = "Namespace to use instead of the schema's targetNamespace")]
    pub namespace: Option<String>,

    #[arg(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Log more; repeat for more detail")]
    pub verbose: u8,
}
