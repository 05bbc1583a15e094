use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a CQL script against an in-memory cluster
    Run {
        #[arg(long, help = "CQL script path")]
        file: String,

        #[arg(
            long,
            allow_negative_numbers = true,
            help = "Rows per page; 0, a negative value or 2147483647 disables paging"
        )]
        page_size: Option<i32>,

        #[arg(long, help = "Keyspace to create if missing and use for the script")]
        keyspace: Option<String>,

        #[arg(long, help = "Driver configuration file (JSON)")]
        config: Option<String>,

        #[arg(long, help = "Extra KEY=VALUE file applied on top of the environment")]
        env_file: Option<String>,

        #[arg(long, default_value_t = 1, help = "Number of simulated nodes")]
        nodes: usize,

        #[arg(long, help = "Print rows as JSON lines instead of a table")]
        json: bool,
    },
    /// Print the smallest and largest value of every fixed-width type
    Bounds {
        #[arg(long, help = "Print the table as JSON")]
        json: bool,
    },
}
