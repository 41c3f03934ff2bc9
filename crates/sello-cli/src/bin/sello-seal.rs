use sello_cli::seal::{self, SealArgs};

fn main() -> anyhow::Result<()> {
    let args: SealArgs = sello_cli::parse_args();
    sello_cli::init_logging(args.verbose);
    seal::run(&args)
}
