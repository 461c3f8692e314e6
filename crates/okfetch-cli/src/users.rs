use clap::Args;
use okfetch_users::{HttpUserRepository, UserRepository};

#[derive(Clone, Debug, Args)]
pub struct UsersArg {
    /// Base URL serving `/users`
    #[arg(long)]
    pub host: String,

    /// Fetch a single user instead of the full list
    #[arg(long)]
    pub id: Option<u64>,
}

pub async fn run(arg: UsersArg) -> anyhow::Result<()> {
    let repo = HttpUserRepository::new(&arg.host);
    tracing::debug!(host = repo.host(), id = ?arg.id, "fetching users");

    let rendered = match arg.id {
        Some(id) => serde_json::to_string_pretty(&repo.get_by_id(id).await?)?,
        None => serde_json::to_string_pretty(&repo.get_all().await?)?,
    };
    println!("{rendered}");
    Ok(())
}
