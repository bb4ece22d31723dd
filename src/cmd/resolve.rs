use clap::Args;
use resolvd_proto::QueryType;
use resolvd_resolver::ResolveMode;

/// Resolves a single name against the core without starting the listener,
/// useful for exercising the resolver from the command line.
#[derive(Args, Debug)]
pub struct Command {
    /// Name to resolve, e.g. `example.com`.
    name: String,
    /// Record type to query.
    #[arg(long, default_value = "A")]
    qtype: String,
    /// Resolution strategy to use.
    #[arg(long, default_value = "auto")]
    mode: ResolveMode,
}

impl Command {
    pub async fn run(&self, config: crate::config::Config) {
        let qtype = parse_qtype(&self.qtype);
        let facade = super::serve::build_facade(&config).await;
        let outcome = facade.resolve(&self.name, qtype, self.mode).await;

        println!("mode: {}", outcome.mode);
        println!("source: {:?}", outcome.source);
        println!("duration_ms: {}", outcome.duration_ms);
        match outcome.data {
            Some(message) => {
                for record in &message.answers {
                    println!("{} {:?} {:?}", record.name, record.ttl, record.data);
                }
            }
            None => println!("error: {}", outcome.error.unwrap_or_default()),
        }
    }
}

fn parse_qtype(raw: &str) -> QueryType {
    match raw.to_ascii_uppercase().as_str() {
        "A" => QueryType::A,
        "AAAA" => QueryType::AAAA,
        "NS" => QueryType::NS,
        "CNAME" => QueryType::CNAME,
        "SOA" => QueryType::SOA,
        "PTR" => QueryType::PTR,
        "MX" => QueryType::MX,
        "TXT" => QueryType::TXT,
        other => QueryType::Unknown(other.parse().unwrap_or(0)),
    }
}
