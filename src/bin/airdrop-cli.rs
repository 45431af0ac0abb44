use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use airdrop_registry::airdrop::{parse_merkle_root, unix_now, CampaignParams};
use airdrop_registry::config::RegistryConfig;
use airdrop_registry::AirdropRegistry;

// ========= CLI =========

#[derive(Parser, Debug)]
#[command(name = "airdrop-cli", version, about = "Local airdrop registry admin CLI")]
struct Cli {
    /// Registry database path (defaults to AIRDROP_DATA_DIR/registry.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new (inactive) campaign
    Create {
        /// Reward token address
        #[arg(long)]
        token: String,

        /// Total reward amount in smallest units
        #[arg(long)]
        total: u128,

        /// Window start (unix seconds)
        #[arg(long)]
        start: u64,

        /// Window end (unix seconds)
        #[arg(long)]
        end: u64,

        /// Optional 32-byte hex commitment, stored for reference only
        #[arg(long = "merkle-root")]
        merkle_root: Option<String>,
    },

    /// Set eligibility from a CSV file "user,amount" per line
    Eligibility {
        #[arg(long)]
        id: u64,

        #[arg(long)]
        csv: PathBuf,
    },

    Activate {
        #[arg(long)]
        id: u64,
    },

    Deactivate {
        #[arg(long)]
        id: u64,
    },

    /// Cancel a campaign (terminal)
    Cancel {
        #[arg(long)]
        id: u64,
    },

    /// Claim on behalf of a user
    Claim {
        /// One or more campaign ids
        #[arg(long = "id", required = true)]
        ids: Vec<u64>,

        #[arg(long)]
        user: String,

        /// Override "now" (unix seconds)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Sweep the unclaimed remainder of an ended or cancelled campaign
    Withdraw {
        #[arg(long)]
        id: u64,

        #[arg(long)]
        now: Option<u64>,
    },

    /// Show one campaign with its eligibility table
    Show {
        #[arg(long)]
        id: u64,
    },

    /// List all campaigns
    List,
}

fn read_eligibility_csv(path: &Path) -> Result<(Vec<String>, Vec<u128>)> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("read eligibility csv {}", path.display()))?;
    parse_eligibility_csv(&txt).with_context(|| format!("in {}", path.display()))
}

/// `user,amount` rows; blank lines and `#` comments are skipped.
fn parse_eligibility_csv(txt: &str) -> Result<(Vec<String>, Vec<u128>)> {
    let mut users = Vec::new();
    let mut amounts = Vec::new();
    for (lineno, line) in txt.lines().enumerate() {
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = t.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 || parts[0].is_empty() {
            bail!("bad csv at line {}", lineno + 1);
        }
        let amount = u128::from_str(parts[1])
            .map_err(|e| anyhow!("invalid amount at line {}: {}", lineno + 1, e))?;
        users.push(parts[0].to_string());
        amounts.push(amount);
    }
    if users.is_empty() {
        bail!("no eligibility rows");
    }
    Ok((users, amounts))
}

fn print_json(value: serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let db_path = match cli.db {
        Some(p) => p,
        None => {
            let cfg = RegistryConfig::from_env();
            fs::create_dir_all(&cfg.data_dir)?;
            cfg.db_path()
        }
    };
    let registry = AirdropRegistry::open(&db_path)
        .with_context(|| format!("open registry at {}", db_path.display()))?;

    match cli.cmd {
        Commands::Create {
            token,
            total,
            start,
            end,
            merkle_root,
        } => {
            let mut params = CampaignParams::new(&token, total, start, end);
            if let Some(root) = merkle_root {
                params.merkle_root = Some(parse_merkle_root(&root)?);
            }
            let id = registry.create_campaign_with(params)?;
            print_json(serde_json::json!({ "campaign_id": id }))?;
        }

        Commands::Eligibility { id, csv } => {
            let (users, amounts) = read_eligibility_csv(&csv)?;
            registry.set_eligibility(id, &users, &amounts)?;
            print_json(serde_json::json!({ "campaign_id": id, "users": users.len() }))?;
        }

        Commands::Activate { id } => {
            registry.activate(id)?;
            print_json(serde_json::json!({ "campaign_id": id, "active": true }))?;
        }

        Commands::Deactivate { id } => {
            registry.deactivate(id)?;
            print_json(serde_json::json!({ "campaign_id": id, "active": false }))?;
        }

        Commands::Cancel { id } => {
            registry.cancel(id)?;
            print_json(serde_json::json!({ "campaign_id": id, "cancelled": true }))?;
        }

        Commands::Claim { ids, user, now } => {
            let now = now.unwrap_or_else(unix_now);
            let results: Vec<serde_json::Value> = registry
                .batch_claim(&ids, &user, now)
                .into_iter()
                .map(|o| match o.result {
                    Ok(amount) => serde_json::json!({
                        "campaign_id": o.campaign_id,
                        "ok": true,
                        "amount": amount.to_string(),
                    }),
                    Err(e) => serde_json::json!({
                        "campaign_id": o.campaign_id,
                        "ok": false,
                        "code": e.kind(),
                        "error": e.to_string(),
                    }),
                })
                .collect();
            print_json(serde_json::json!({ "user": user, "results": results }))?;
        }

        Commands::Withdraw { id, now } => {
            let amount = registry.withdraw_unclaimed(id, now.unwrap_or_else(unix_now))?;
            print_json(serde_json::json!({ "campaign_id": id, "amount": amount.to_string() }))?;
        }

        Commands::Show { id } => {
            let campaign = registry
                .campaign(id)?
                .ok_or_else(|| anyhow!("campaign {} not found", id))?;
            let entries: Vec<serde_json::Value> = registry
                .eligible_users(id)?
                .into_iter()
                .map(|(user, e)| {
                    serde_json::json!({
                        "user": user,
                        "amount": e.amount.to_string(),
                        "claimed": e.claimed,
                    })
                })
                .collect();
            print_json(serde_json::json!({
                "id": campaign.id,
                "token_address": campaign.token_address,
                "total_amount": campaign.total_amount.to_string(),
                "claimed_amount": campaign.claimed_amount.to_string(),
                "phase": campaign.phase(unix_now()).as_str(),
                "start_time": campaign.start_time,
                "end_time": campaign.end_time,
                "eligibility": entries,
            }))?;
        }

        Commands::List => {
            let now = unix_now();
            for c in registry.campaigns()? {
                println!(
                    "#{:<5} {:<10} token={} claimed={}/{} window={}..{}",
                    c.id,
                    c.phase(now).as_str(),
                    c.token_address,
                    c.claimed_amount,
                    c.total_amount,
                    c.start_time,
                    c.end_time
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_skips_comments_and_blanks() {
        let (users, amounts) = parse_eligibility_csv(
            "# user,amount\n\n0xA, 100\n   \n  # trailing note\n0xB,2\n",
        )
        .unwrap();
        assert_eq!(users, vec!["0xA".to_string(), "0xB".to_string()]);
        assert_eq!(amounts, vec![100, 2]);
    }

    #[test]
    fn test_parse_csv_large_amount() {
        let (_, amounts) = parse_eligibility_csv("0xA,340282366920938463463374607431768211455").unwrap();
        assert_eq!(amounts, vec![u128::MAX]);
    }

    #[test]
    fn test_parse_csv_rejects_bad_rows() {
        let err = parse_eligibility_csv("0xA,1\n0xB\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = parse_eligibility_csv("0xA,1,extra").unwrap_err();
        assert!(err.to_string().contains("line 1"));

        let err = parse_eligibility_csv("0xA,ten").unwrap_err();
        assert!(err.to_string().contains("invalid amount at line 1"));

        assert!(parse_eligibility_csv("0xA,-1").is_err());
        assert!(parse_eligibility_csv(",5").is_err());
    }

    #[test]
    fn test_parse_csv_requires_rows() {
        assert!(parse_eligibility_csv("").is_err());
        assert!(parse_eligibility_csv("# only a comment\n\n").is_err());
    }
}
