use std::process::ExitCode;

fn main() -> ExitCode {
    hotelbot_cli::run()
}
