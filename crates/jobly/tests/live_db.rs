//! End-to-end tests against a real Postgres.
//!
//! Skipped unless `DATABASE_URL` is set. Each test creates temporary tables
//! inside a transaction and rolls it back, so nothing persists.

use jobly::{
    Company, CompanyUpdate, Job, JobUpdate, JoblyError, NewCompany, NewJob, TracedClient,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::{Client, NoTls, Transaction};

const SCHEMA: &str = include_str!("../sql/schema.sql");

async fn try_connect() -> Option<Client> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn seed(tx: &Transaction<'_>) -> Vec<Job> {
    tx.batch_execute(&SCHEMA.replace("CREATE TABLE", "CREATE TEMP TABLE"))
        .await
        .unwrap();

    for n in 1..=3 {
        Company::create(
            tx,
            &NewCompany {
                handle: format!("c{n}"),
                name: format!("C{n}"),
                description: format!("Desc{n}"),
                num_employees: Some(n),
                logo_url: Some(format!("http://c{n}.img")),
            },
        )
        .await
        .unwrap();
    }

    let mut jobs = Vec::new();
    for (title, salary, equity) in [("J1", 100, "0.1"), ("J2", 200, "0.2"), ("J3", 300, "0")] {
        let job = Job::create(
            tx,
            &NewJob {
                title: title.to_string(),
                salary: Some(salary),
                equity: Some(dec(equity)),
                company_handle: "c1".to_string(),
            },
        )
        .await
        .unwrap();
        jobs.push(job);
    }
    jobs
}

#[tokio::test]
async fn company_filters_end_to_end() {
    let Some(mut client) = try_connect().await else {
        return;
    };
    let tx = client.transaction().await.unwrap();
    seed(&tx).await;

    let handles = |companies: Vec<Company>| -> Vec<String> {
        companies.into_iter().map(|c| c.handle).collect()
    };

    let found = Company::find_filtered(&tx, [("minEmployees", "2")]).await.unwrap();
    assert_eq!(handles(found), vec!["c2", "c3"]);

    let found = Company::find_filtered(&tx, [("minEmployees", "1"), ("maxEmployees", "2")])
        .await
        .unwrap();
    assert_eq!(handles(found), vec!["c1", "c2"]);

    let found = Company::find_filtered(&tx, [("name", "c3")]).await.unwrap();
    assert_eq!(handles(found), vec!["c3"]);

    let err = Company::find_filtered(&tx, [("name", "nope")]).await.unwrap_err();
    assert!(err.is_not_found());

    let all = Company::find_filtered(&tx, [("color", "blue")]).await.unwrap();
    assert_eq!(all.len(), 3);

    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn job_filters_coerce_text_salary() {
    let Some(mut client) = try_connect().await else {
        return;
    };
    let tx = client.transaction().await.unwrap();
    seed(&tx).await;

    let found = Job::find_filtered(&tx, [("hasEquity", "true"), ("minSalary", "150")])
        .await
        .unwrap();
    let titles: Vec<_> = found.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["J2"]);

    let found = Job::find_filtered(&tx, [("title", "j")]).await.unwrap();
    assert_eq!(found.len(), 3);

    let err = Job::find_filtered(&tx, [("minSalary", "1000")]).await.unwrap_err();
    assert!(err.is_not_found());

    let err = Job::find_filtered(&tx, [("minSalary", "lots")]).await.unwrap_err();
    assert!(matches!(err, JoblyError::Query(_)));

    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn crud_round_trip() {
    let Some(mut client) = try_connect().await else {
        return;
    };
    let tx = client.transaction().await.unwrap();
    let jobs = seed(&tx).await;
    let traced = TracedClient::new(&tx);

    let detail = Company::get(&traced, "c1").await.unwrap();
    assert_eq!(detail.company.name, "C1");
    assert_eq!(detail.jobs.len(), 3);

    let updated = Company::update(
        &traced,
        "c1",
        CompanyUpdate {
            num_employees: Some(10),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.num_employees, Some(10));
    assert_eq!(updated.logo_url.as_deref(), Some("http://c1.img"));

    let job = Job::update(
        &traced,
        jobs[0].id,
        JobUpdate {
            salary: Some(150),
            equity: Some(dec("0.05")),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(job.salary, Some(150));
    assert_eq!(job.equity, Some(dec("0.05")));

    let detail = Job::get(&traced, jobs[0].id).await.unwrap();
    assert_eq!(detail.company.handle, "c1");

    let err = Job::create(
        &traced,
        &NewJob {
            title: "J1".into(),
            salary: None,
            equity: None,
            company_handle: "c2".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::BadRequest(_)));

    Job::remove(&traced, jobs[0].id).await.unwrap();
    assert!(Job::get(&traced, jobs[0].id).await.unwrap_err().is_not_found());

    Company::remove(&traced, "c1").await.unwrap();
    assert!(Company::get(&traced, "c1").await.unwrap_err().is_not_found());

    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn constraint_errors_are_classified() {
    let Some(mut client) = try_connect().await else {
        return;
    };
    let mut tx = client.transaction().await.unwrap();
    seed(&tx).await;

    let sp = tx.savepoint("duplicate_name").await.unwrap();
    let err = Company::create(
        &sp,
        &NewCompany {
            handle: "c9".into(),
            name: "C1".into(),
            description: "same name as c1".into(),
            num_employees: None,
            logo_url: None,
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_unique_violation(), "{err}");
    sp.rollback().await.unwrap();

    let sp = tx.savepoint("missing_company").await.unwrap();
    let err = Job::create(
        &sp,
        &NewJob {
            title: "Orphan".into(),
            salary: None,
            equity: None,
            company_handle: "ghost".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)), "{err}");
    sp.rollback().await.unwrap();

    tx.rollback().await.unwrap();
}
