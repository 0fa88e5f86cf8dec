//! Command-line interface.
//!
//! With no subcommand the binary runs the gateway. `send-to-phone` and
//! `broadcast` call a running gateway over HTTP.

mod invoke;

pub use self::invoke::{GatewayClient, GatewayReply, InvokeError, split_recipients};

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, builder::NonEmptyStringValueParser};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5001";

#[derive(Parser, Debug)]
#[command(
    name = "signal-gateway",
    version,
    about = "HTTP gateway in front of signal-cli-rest-api"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP gateway (the default).
    Serve {
        /// Serve mock data instead of calling the Signal API.
        #[arg(long)]
        demo: bool,
    },

    /// Send a message to one phone number through a running gateway.
    #[command(after_help = "Example:\n  signal-gateway send-to-phone \"+40751770274\" \"Hello!\"\n\n\
        Phone numbers should include the country code (e.g. +1, +40).")]
    SendToPhone {
        /// Recipient phone number.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        phone_number: String,

        /// Message text.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        message: String,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Send one message to several phone numbers through a running gateway.
    #[command(after_help = "Examples:\n  signal-gateway broadcast \"+40751770274,+12025551234\" \"Hello everyone!\"\n  \
        signal-gateway broadcast \"+40751770274 +12025551234 +447700900123\" \"Meeting at 3pm\"\n\n\
        Separate numbers with commas or spaces. Include the country code (e.g. +1, +40).")]
    Broadcast {
        /// Phone numbers separated by commas or whitespace.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        phone_numbers: String,

        /// Message text.
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        message: String,

        #[command(flatten)]
        backend: BackendArgs,
    },
}

/// Where the invokers find the gateway.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Gateway base URL.
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,
}

/// Run `send-to-phone`, printing a summary on stdout or a failure report on
/// stderr.
pub async fn run_send_to_phone(
    backend: &BackendArgs,
    phone_number: &str,
    message: &str,
) -> ExitCode {
    println!("Sending message...");
    println!("  To:      {phone_number}");
    println!("  Message: {message}");
    println!();

    let result = match GatewayClient::new(&backend.backend_url) {
        Ok(client) => client.send_to_phone(phone_number, message).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(reply) => {
            println!("[ok] Message sent successfully");
            println!("  Timestamp: {}", reply.timestamp_display());
            println!("  Recipient: {}", reply.recipient.as_deref().unwrap_or("-"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure("Error sending message", &e);
            ExitCode::FAILURE
        }
    }
}

/// Run `broadcast`, printing a summary on stdout or a failure report on
/// stderr.
pub async fn run_broadcast(backend: &BackendArgs, phone_numbers: &str, message: &str) -> ExitCode {
    let numbers = split_recipients(phone_numbers);
    if numbers.is_empty() {
        eprintln!("[error] No valid phone numbers provided");
        return ExitCode::FAILURE;
    }

    println!("Broadcasting message...");
    println!("  To {} recipients:", numbers.len());
    for (idx, number) in numbers.iter().enumerate() {
        println!("    {}. {}", idx + 1, number);
    }
    println!("  Message: {message}");
    println!();

    let result = match GatewayClient::new(&backend.backend_url) {
        Ok(client) => client.broadcast(&numbers, message).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(reply) => {
            println!("[ok] Message broadcast successfully");
            println!(
                "  Sent to {} recipients",
                reply.recipient_count.unwrap_or(reply.recipients.len())
            );
            println!("  Timestamp: {}", reply.timestamp_display());
            println!("  Recipients:");
            for (idx, number) in reply.recipients.iter().enumerate() {
                println!("    {}. {}", idx + 1, number);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure("Error broadcasting message", &e);
            ExitCode::FAILURE
        }
    }
}

fn report_failure(headline: &str, error: &InvokeError) {
    eprintln!("[error] {headline}:");
    match error {
        InvokeError::Rejected {
            error,
            details,
            hint,
            ..
        } => {
            eprintln!("  {error}");
            if let Some(details) = details {
                eprintln!("  Details: {details}");
            }
            if let Some(hint) = hint {
                eprintln!("  Hint: {hint}");
            }
        }
        InvokeError::Unreachable { url } => {
            eprintln!("  Cannot connect to backend server");
            eprintln!("  Hint: Make sure backend is running on {url}");
        }
        other => eprintln!("  {other}"),
    }
}
