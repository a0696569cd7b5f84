use clap::{Args, Subcommand};

/// Where to reach the database.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnArgs {
    /// Database format: "mysql" or "pg". Inferred from the URL scheme when omitted
    #[arg(short, long)]
    pub format: Option<String>,

    /// Connection URL. Falls back to $ACCTQ_DATABASE_URL
    #[arg(short, long)]
    pub conn_str: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the SQL an account filter compiles to, without running it
    Compile {
        #[arg(long, help = "Filter as JSON text, or @path to a JSON file")]
        filter: String,

        #[arg(long, help = "SQL dialect to render: \"pg\" or \"mysql\"")]
        dialect: Option<String>,

        #[arg(long, help = "Catalog JSON file (as written by `catalog`)")]
        catalog: Option<String>,

        #[command(flatten)]
        conn: ConnArgs,
    },
    /// Run an account filter and print the matching account ids
    Accts {
        #[arg(long, help = "Filter as JSON text, or @path to a JSON file")]
        filter: String,

        #[arg(long, help = "Catalog JSON file (as written by `catalog`)")]
        catalog: Option<String>,

        #[arg(long, help = "If specified, writes the ids to this file instead of stdout")]
        output: Option<String>,

        #[arg(long, help = "Print one id per line instead of a JSON array")]
        plain: bool,

        #[command(flatten)]
        conn: ConnArgs,
    },
    /// Print properties of a list of accounts
    Props {
        #[arg(
            long,
            conflicts_with = "filter",
            required_unless_present = "filter",
            help = "Account ids separated by commas or whitespace, or @path to a file of ids"
        )]
        accts: Option<String>,

        #[arg(long, help = "Select the accounts with a filter instead of --accts")]
        filter: Option<String>,

        #[arg(long, value_delimiter = ',', required = true, help = "Columns to read")]
        columns: Vec<String>,

        #[arg(long, help = "Catalog JSON file (as written by `catalog`)")]
        catalog: Option<String>,

        #[arg(long, help = "If specified, writes the rows to this file instead of stdout")]
        output: Option<String>,

        #[command(flatten)]
        conn: ConnArgs,
    },
    /// Dump the columns of the account and property tables as a catalog file
    Catalog {
        #[arg(long, help = "If specified, writes the catalog to this file instead of stdout")]
        output: Option<String>,

        #[command(flatten)]
        conn: ConnArgs,
    },
    /// Test a connection string
    TestConn {
        #[command(flatten)]
        conn: ConnArgs,
    },
}
