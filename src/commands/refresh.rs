use crate::api::Mode;
use crate::commands::{reference, start, Out};
use crate::model::{ReferenceData, TransactionType};
use crate::{Config, Result};

/// Throws away the cached accounts and categories and reads them again.
///
/// # Errors
/// - The credentials cannot be loaded.
/// - The header row cannot be read.
pub async fn refresh(config: Config, mode: Mode) -> Result<Out<ReferenceData>> {
    let session = start(config, mode).await?;
    let data = reference(&session, true).await?;
    let message = format!(
        "Reloaded {} accounts ({}) and {} {}, {} {} and {} {} categories",
        data.accounts().len(),
        data.accounts().join(", "),
        data.categories.expense.len(),
        TransactionType::Expense,
        data.categories.income.len(),
        TransactionType::Income,
        data.categories.invest.len(),
        TransactionType::Invest,
    );
    let warnings = data.warnings.clone();
    Ok(Out::new(message, data).with_warnings(warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_refresh() {
        let env = TestEnv::new().await;
        let out = refresh(env.config(), Mode::Test).await.unwrap();
        assert_eq!(
            out.message(),
            "Reloaded 5 accounts (Cash, BDO, GCash, Maya, Credit Card) and 6 EXPENSE, \
            3 INCOME and 3 INVST categories"
        );
        assert!(env.config().reference_cache_path().is_file());
    }

    #[tokio::test]
    async fn test_refresh_sees_new_accounts() {
        let env = TestEnv::new().await;
        refresh(env.config(), Mode::Test).await.unwrap();
        env.set_header(&["Date", "Type", "Category", "Note", "Cash", "Wallet"]);
        let out = refresh(env.config(), Mode::Test).await.unwrap();
        assert_eq!(
            out.structure().unwrap().accounts(),
            &["Cash", "Wallet"]
        );
    }
}
