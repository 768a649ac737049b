use optkit::{HelpText, arg_str, opt_integral, options, switch};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    init_tracing();

    let parser = switch("verbose", Some(HelpText::from("Log each line as it is printed")))
        .zip(switch("upper", Some(HelpText::from("Upper-case the message"))))
        .zip(opt_integral::<u32>(
            "count",
            Some(HelpText::from("Number of times to print the message")),
        ))
        .zip(arg_str("message", Some(HelpText::from("The message to print"))));

    let (((verbose, upper), count), message) =
        options("Print a message several times", &parser);

    tracing::debug!(count, upper, "starting repeat");

    let message = if upper { message.to_uppercase() } else { message };
    for line in 1..=count {
        if verbose {
            tracing::info!(line, "printing");
        }
        println!("{message}");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
