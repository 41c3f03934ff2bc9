use sello_cli::unpack::{self, UnpackArgs};

fn main() -> anyhow::Result<()> {
    let args: UnpackArgs = sello_cli::parse_args();
    sello_cli::init_logging(args.verbose);
    unpack::run(&args)
}
