use std::io;

use monkey_lang::{
    common::{self, Error},
    repl::{Config, Repl, USAGE},
};

fn main() -> Result<(), Error> {
    common::init_tracing();

    let config = match Config::from_args(std::env::args().skip(1))? {
        Some(config) => config,
        None => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    Repl::new(config).run(stdin.lock(), &mut stdout)
}
