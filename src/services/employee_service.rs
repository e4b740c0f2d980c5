// src/services/employee_service.rs
use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::employee::{Employee, EmployeeInput, EmployeeStatus},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const SELECT_EMPLOYEE: &str = r#"
    SELECT id, name, employee_code, project, location, job_title,
           payment_type, pay_rate, sponsorship, status, created_at
    FROM employees
"#;

/// Whole roster, archived employees included, in creation order.
pub async fn find_all_employees(db_pool: &SqlitePool) -> AppResult<Vec<Employee>> {
    tracing::debug!("Loading roster...");
    let employees = sqlx::query_as::<_, Employee>(&format!(
        "{} ORDER BY created_at ASC, name ASC",
        SELECT_EMPLOYEE
    ))
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Roster has {} employees.", employees.len());
    Ok(employees)
}

pub async fn find_employee_by_id(db_pool: &SqlitePool, id: &str) -> AppResult<Option<Employee>> {
    tracing::debug!("Looking up employee {}", id);
    let employee = sqlx::query_as::<_, Employee>(&format!("{} WHERE id = ?1", SELECT_EMPLOYEE))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(employee)
}

fn validate(input: &EmployeeInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Employee name is required".to_string()));
    }
    if input.employee_code.trim().is_empty() {
        return Err(AppError::Validation("Employee code is required".to_string()));
    }
    if !input.pay_rate.is_finite() || input.pay_rate < 0.0 {
        return Err(AppError::Validation("Pay rate must be zero or more".to_string()));
    }
    Ok(())
}

pub async fn create_employee(db_pool: &SqlitePool, input: &EmployeeInput) -> AppResult<Employee> {
    validate(input)?;

    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        employee_code: input.employee_code.trim().to_string(),
        project: input.project.trim().to_string(),
        location: input.location.trim().to_string(),
        job_title: input.job_title.trim().to_string(),
        payment_type: input.payment_type,
        pay_rate: input.pay_rate,
        sponsorship: input.sponsorship,
        status: EmployeeStatus::Active,
        created_at: Utc::now(),
    };
    tracing::info!("Creating employee {} ({})", employee.employee_code, employee.id);

    sqlx::query(
        r#"
        INSERT INTO employees
            (id, name, employee_code, project, location, job_title,
             payment_type, pay_rate, sponsorship, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&employee.id)
    .bind(&employee.name)
    .bind(&employee.employee_code)
    .bind(&employee.project)
    .bind(&employee.location)
    .bind(&employee.job_title)
    .bind(employee.payment_type)
    .bind(employee.pay_rate)
    .bind(employee.sponsorship)
    .bind(employee.status)
    .bind(employee.created_at)
    .execute(db_pool)
    .await
    .map_err(|e| conflict_on_unique(e, "Employee code is already in use"))?;

    tracing::info!("✅ Employee {} created.", employee.employee_code);
    Ok(employee)
}

pub async fn update_employee(
    db_pool: &SqlitePool,
    id: &str,
    input: &EmployeeInput,
) -> AppResult<Employee> {
    validate(input)?;
    tracing::info!("Updating employee {}", id);

    let rows_affected = sqlx::query(
        r#"
        UPDATE employees
        SET name = ?1, employee_code = ?2, project = ?3, location = ?4,
            job_title = ?5, payment_type = ?6, pay_rate = ?7, sponsorship = ?8
        WHERE id = ?9
        "#,
    )
    .bind(input.name.trim())
    .bind(input.employee_code.trim())
    .bind(input.project.trim())
    .bind(input.location.trim())
    .bind(input.job_title.trim())
    .bind(input.payment_type)
    .bind(input.pay_rate)
    .bind(input.sponsorship)
    .bind(id)
    .execute(db_pool)
    .await
    .map_err(|e| conflict_on_unique(e, "Employee code is already in use"))?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Update failed: employee '{}' not found.", id);
        return Err(AppError::NotFound("Employee".to_string()));
    }

    find_employee_by_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
}

/// Archives or restores an employee. Employees are never removed from the roster.
pub async fn set_employee_status(
    db_pool: &SqlitePool,
    id: &str,
    status: EmployeeStatus,
) -> AppResult<Employee> {
    tracing::info!("Setting status of employee {} to {}", id, status);

    let rows_affected = sqlx::query("UPDATE employees SET status = ?1 WHERE id = ?2")
        .bind(status)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Status change failed: employee '{}' not found.", id);
        return Err(AppError::NotFound("Employee".to_string()));
    }

    find_employee_by_id(db_pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::employee::{PaymentType, Sponsorship};

    pub(crate) fn input(code: &str, name: &str) -> EmployeeInput {
        EmployeeInput {
            name: name.to_string(),
            employee_code: code.to_string(),
            project: "Tower".to_string(),
            location: "North".to_string(),
            job_title: "Mason".to_string(),
            payment_type: PaymentType::Monthly,
            pay_rate: 3000.0,
            sponsorship: Sponsorship::Partner,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = create_test_pool().await;
        let created = create_employee(&pool, &input("E-1", "Ana")).await.unwrap();

        let found = find_employee_by_id(&pool, &created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Ana");
        assert_eq!(found.status, EmployeeStatus::Active);
        assert_eq!(found.sponsorship, Sponsorship::Partner);
        assert_eq!(found.payment_type, PaymentType::Monthly);

        let all = find_all_employees(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let pool = create_test_pool().await;
        create_employee(&pool, &input("E-1", "Ana")).await.unwrap();
        let err = create_employee(&pool, &input("E-1", "Bruno")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_validation() {
        let pool = create_test_pool().await;
        let mut bad = input("E-1", "  ");
        assert!(matches!(create_employee(&pool, &bad).await, Err(AppError::Validation(_))));
        bad.name = "Ana".into();
        bad.pay_rate = -1.0;
        assert!(matches!(create_employee(&pool, &bad).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_archive() {
        let pool = create_test_pool().await;
        let created = create_employee(&pool, &input("E-1", "Ana")).await.unwrap();

        let mut changed = input("E-1", "Ana Maria");
        changed.location = "South".into();
        let updated = update_employee(&pool, &created.id, &changed).await.unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.location, "South");

        let archived = set_employee_status(&pool, &created.id, EmployeeStatus::Archived)
            .await
            .unwrap();
        assert!(archived.is_archived());

        // Archived employees stay in the roster.
        assert_eq!(find_all_employees(&pool).await.unwrap().len(), 1);

        let restored = set_employee_status(&pool, &created.id, EmployeeStatus::Active)
            .await
            .unwrap();
        assert!(!restored.is_archived());
    }

    #[tokio::test]
    async fn test_missing_employee_is_not_found() {
        let pool = create_test_pool().await;
        let err = update_employee(&pool, "nope", &input("E-9", "X")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = set_employee_status(&pool, "nope", EmployeeStatus::Archived)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
