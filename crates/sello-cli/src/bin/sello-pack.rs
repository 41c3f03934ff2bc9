use sello_cli::pack::{self, PackArgs};

fn main() -> anyhow::Result<()> {
    let args: PackArgs = sello_cli::parse_args();
    sello_cli::init_logging(args.verbose);
    pack::run(&args)
}
