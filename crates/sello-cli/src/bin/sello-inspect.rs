use sello_cli::inspect::{self, InspectArgs};

fn main() -> anyhow::Result<()> {
    let args: InspectArgs = sello_cli::parse_args();
    sello_cli::init_logging(args.verbose);
    inspect::run(&args)
}
