// src/db/client_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::client::{ClientDraft, ClientRow},
};

const CLIENT_COLUMNS: &str = "id, status, client_type, name, contact_number, email, document, \
    birth_date, origin, observations, service_category, cep, address, house_number, \
    neighborhood, city, state, monthly_consumption, plant_power_kwp, irradiation, roof_type, \
    apportionment, inverters, modules, costs, payments, created_by, created_at";

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    // Mais recentes primeiro
    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<ClientRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ClientRow>(&sql).fetch_all(executor).await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ClientRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Insere o cliente usando o id do próprio rascunho.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        draft: &ClientDraft,
        created_by: Option<Uuid>,
    ) -> Result<ClientRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (
                id, status, client_type, name, contact_number, email, document, birth_date,
                origin, observations, service_category, cep, address, house_number,
                neighborhood, city, state, monthly_consumption, plant_power_kwp, irradiation,
                roof_type, apportionment, inverters, modules, costs, payments, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(draft.id)
            .bind(draft.status)
            .bind(draft.client_type)
            .bind(&draft.name)
            .bind(&draft.contact_number)
            .bind(&draft.email)
            .bind(&draft.document)
            .bind(&draft.birth_date)
            .bind(draft.origin)
            .bind(&draft.observations)
            .bind(draft.service_category)
            .bind(&draft.cep)
            .bind(&draft.address)
            .bind(&draft.house_number)
            .bind(&draft.neighborhood)
            .bind(&draft.city)
            .bind(&draft.state)
            .bind(Json(&draft.monthly_consumption))
            .bind(draft.plant_power_kwp.raw())
            .bind(draft.irradiation.raw())
            .bind(&draft.roof_type)
            .bind(&draft.apportionment)
            .bind(&draft.inverters)
            .bind(&draft.modules)
            .bind(Json(&draft.costs))
            .bind(Json(&draft.payments))
            .bind(created_by)
            .fetch_one(executor)
            .await
            // id repetido vem do corpo da requisição; autor inexistente também
            .map_err(|e| {
                map_constraint_error(e, Some(AppError::ClientAlreadyExists), Some(AppError::UserNotFound))
            })?;
        Ok(row)
    }

    /// Sobrescreve todos os campos editáveis. `created_by` e `created_at` ficam intactos.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        draft: &ClientDraft,
    ) -> Result<Option<ClientRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients SET
                status = $2, client_type = $3, name = $4, contact_number = $5, email = $6,
                document = $7, birth_date = $8, origin = $9, observations = $10,
                service_category = $11, cep = $12, address = $13, house_number = $14,
                neighborhood = $15, city = $16, state = $17, monthly_consumption = $18,
                plant_power_kwp = $19, irradiation = $20, roof_type = $21, apportionment = $22,
                inverters = $23, modules = $24, costs = $25, payments = $26,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .bind(draft.status)
            .bind(draft.client_type)
            .bind(&draft.name)
            .bind(&draft.contact_number)
            .bind(&draft.email)
            .bind(&draft.document)
            .bind(&draft.birth_date)
            .bind(draft.origin)
            .bind(&draft.observations)
            .bind(draft.service_category)
            .bind(&draft.cep)
            .bind(&draft.address)
            .bind(&draft.house_number)
            .bind(&draft.neighborhood)
            .bind(&draft.city)
            .bind(&draft.state)
            .bind(Json(&draft.monthly_consumption))
            .bind(draft.plant_power_kwp.raw())
            .bind(draft.irradiation.raw())
            .bind(&draft.roof_type)
            .bind(&draft.apportionment)
            .bind(&draft.inverters)
            .bind(&draft.modules)
            .bind(Json(&draft.costs))
            .bind(Json(&draft.payments))
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    // Retorna true se alguma linha foi removida
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
