use clap::{Parser, Subcommand, ValueEnum};

/// pgrecipe - durable PostgreSQL database provisioning
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Run the control-plane API and orchestration host
    Serve {
        /// API port (default: SERVER_PORT or 7999)
        #[arg(short, long)]
        port: Option<u16>,

        /// Orchestration host to run workflows on
        #[arg(long, value_enum, default_value_t = HostKind::Duroxide)]
        host: HostKind,
    },

    /// Schedule a workflow on a running server
    Schedule {
        /// Orchestration name (e.g. "PostgresSQLDatabasesPut")
        name: String,

        /// Workflow input as JSON, or @path to read it from a file
        #[arg(short, long)]
        input: String,

        /// Instance id to schedule under
        #[arg(long)]
        id: Option<String>,
    },

    /// Show the status of a workflow instance
    Status {
        /// Instance id
        id: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    /// Duroxide runtime over PostgreSQL (requires DATABASE_URL)
    Duroxide,
    /// In-process replay host; state is lost on exit
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let args = Args::try_parse_from(["pgrecipe-server", "serve"]).unwrap();
        match args.mode {
            Mode::Serve { port, host } => {
                assert_eq!(port, None);
                assert_eq!(host, HostKind::Duroxide);
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_schedule_args() {
        let args = Args::try_parse_from([
            "pgrecipe-server",
            "schedule",
            "PostgresSQLDatabasesPut",
            "--input",
            "@recipe.json",
            "--id",
            "put-1",
        ])
        .unwrap();
        match args.mode {
            Mode::Schedule { name, input, id } => {
                assert_eq!(name, "PostgresSQLDatabasesPut");
                assert_eq!(input, "@recipe.json");
                assert_eq!(id.as_deref(), Some("put-1"));
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_memory_host() {
        let args =
            Args::try_parse_from(["pgrecipe-server", "serve", "--host", "memory", "-p", "8000"]).unwrap();
        match args.mode {
            Mode::Serve { port, host } => {
                assert_eq!(port, Some(8000));
                assert_eq!(host, HostKind::Memory);
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }
}
