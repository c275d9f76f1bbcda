//! Customer inspection commands.

use std::sync::Arc;

use farmaup_api::db::PgCustomerStore;
use farmaup_api::services::CustomerService;
use farmaup_core::{Customer, CustomerFilter};

use super::{CommandError, connect};

/// Print customers matching the filter, one per line.
pub async fn list(name: Option<String>, city: Option<String>) -> Result<(), CommandError> {
    let pool = connect().await?;
    let service = CustomerService::new(Arc::new(PgCustomerStore::new(pool.clone())));

    let list = service.list(CustomerFilter::new(name, city)).await?;

    #[allow(clippy::print_stdout)]
    {
        for customer in &list.customers {
            println!("{}", format_row(customer));
        }
        println!("{} customer(s)", list.total);
    }

    pool.close().await;
    Ok(())
}

fn format_row(customer: &Customer) -> String {
    format!(
        "{:>5}  {:<24}  {:<32}  {:<11}  {}",
        customer.id.as_i32(),
        customer.name,
        customer.email.as_str(),
        customer.phone.as_str(),
        customer.city
    )
}
