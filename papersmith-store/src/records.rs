use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use papersmith_core::{
    DocumentStore, OcrStatus, Paper, PaperStatus, PaperStore, PaperUpdate, SourceDocument,
    StoreError, Subject, SubjectStore,
};

use crate::error::query_error;
use crate::sqlite::{decode_json, decode_time, encode_json, encode_time, placeholders};
use crate::SqliteStore;

fn check_id(id: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(query_error)
}

fn unit_number(value: i64) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Internal(format!("invalid unit {value}").into()))
}

fn document_from_row(row: &SqliteRow) -> Result<SourceDocument, StoreError> {
    let status: String = get(row, "ocr_status")?;
    let created_at: String = get(row, "created_at")?;
    let updated_at: String = get(row, "updated_at")?;
    Ok(SourceDocument {
        id: get(row, "id")?,
        faculty_id: get(row, "faculty_id")?,
        subject_id: get(row, "subject_id")?,
        unit_number: unit_number(get(row, "unit_number")?)?,
        file_name: get(row, "file_name")?,
        file_path: get(row, "file_path")?,
        file_type: get(row, "file_type")?,
        extracted_text: get(row, "extracted_text")?,
        ocr_status: status.parse::<OcrStatus>()?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
    })
}

fn paper_from_row(row: &SqliteRow) -> Result<Paper, StoreError> {
    let units: String = get(row, "units")?;
    let difficulty: String = get(row, "difficulty")?;
    let question_config: String = get(row, "question_config")?;
    let status: String = get(row, "status")?;
    let questions: String = get(row, "questions")?;
    let created_at: String = get(row, "created_at")?;
    let updated_at: String = get(row, "updated_at")?;
    Ok(Paper {
        id: get(row, "id")?,
        faculty_id: get(row, "faculty_id")?,
        subject_id: get(row, "subject_id")?,
        title: get(row, "title")?,
        units: decode_json("units", &units)?,
        difficulty: difficulty.parse()?,
        custom_instructions: get(row, "custom_instructions")?,
        question_config: decode_json("question_config", &question_config)?,
        status: status.parse()?,
        questions: decode_json("questions", &questions)?,
        error: get(row, "error")?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
    })
}

fn subject_from_row(row: &SqliteRow) -> Result<Subject, StoreError> {
    let created_at: String = get(row, "created_at")?;
    Ok(Subject {
        id: get(row, "id")?,
        name: get(row, "name")?,
        code: get(row, "code")?,
        description: get(row, "description")?,
        created_at: decode_time(&created_at)?,
    })
}

impl SqliteStore {
    async fn exists(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(count > 0)
    }

    /// Conditional status update shared by documents and papers: applies only
    /// while the current status is one of `from`.
    async fn compare_and_set_status(
        &self,
        table: &str,
        column: &str,
        id: &str,
        from: &[&str],
        to: &str,
    ) -> Result<bool, StoreError> {
        if from.is_empty() {
            if self.exists(table, id).await? {
                return Ok(false);
            }
            return Err(StoreError::NotFound(id.to_string()));
        }

        let sql = format!(
            "UPDATE {table} SET {column} = ?, updated_at = ? WHERE id = ? AND {column} IN ({})",
            placeholders(from.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(to)
            .bind(encode_time(&Utc::now()))
            .bind(id);
        for status in from {
            query = query.bind(*status);
        }
        let result = query.execute(&self.pool).await.map_err(query_error)?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.exists(table, id).await? {
            Ok(false)
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert_document(&self, document: &SourceDocument) -> Result<(), StoreError> {
        check_id(&document.id)?;
        sqlx::query(
            "INSERT OR REPLACE INTO documents (id, faculty_id, subject_id, unit_number, file_name, \
             file_path, file_type, extracted_text, ocr_status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&document.id)
        .bind(&document.faculty_id)
        .bind(&document.subject_id)
        .bind(i64::from(document.unit_number))
        .bind(&document.file_name)
        .bind(&document.file_path)
        .bind(&document.file_type)
        .bind(&document.extracted_text)
        .bind(document.ocr_status.as_str())
        .bind(encode_time(&document.created_at))
        .bind(encode_time(&document.updated_at))
        .execute(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<SourceDocument>, StoreError> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(document_from_row).transpose()
    }

    async fn list_documents(
        &self,
        subject_id: &str,
        faculty_id: &str,
    ) -> Result<Vec<SourceDocument>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM documents WHERE subject_id = ? AND faculty_id = ? \
             ORDER BY created_at ASC",
        )
        .bind(subject_id)
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;
        rows.iter().map(document_from_row).collect()
    }

    async fn transition_ocr_status(
        &self,
        id: &str,
        from: &[OcrStatus],
        to: OcrStatus,
    ) -> Result<bool, StoreError> {
        let from: Vec<&str> = from.iter().map(OcrStatus::as_str).collect();
        self.compare_and_set_status("documents", "ocr_status", id, &from, to.as_str())
            .await
    }

    async fn complete_ocr(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET extracted_text = ?, ocr_status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(text)
        .bind(OcrStatus::Completed.as_str())
        .bind(encode_time(&Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn fail_ocr(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE documents SET ocr_status = ?, updated_at = ? WHERE id = ?")
            .bind(OcrStatus::Failed.as_str())
            .bind(encode_time(&Utc::now()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaperStore for SqliteStore {
    async fn insert_paper(&self, paper: &Paper) -> Result<(), StoreError> {
        check_id(&paper.id)?;
        sqlx::query(
            "INSERT OR REPLACE INTO papers (id, faculty_id, subject_id, title, units, difficulty, \
             custom_instructions, question_config, status, questions, error, created_at, \
             updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&paper.id)
        .bind(&paper.faculty_id)
        .bind(&paper.subject_id)
        .bind(&paper.title)
        .bind(encode_json("units", &paper.units)?)
        .bind(paper.difficulty.as_str())
        .bind(&paper.custom_instructions)
        .bind(encode_json("question_config", &paper.question_config)?)
        .bind(paper.status.as_str())
        .bind(encode_json("questions", &paper.questions)?)
        .bind(&paper.error)
        .bind(encode_time(&paper.created_at))
        .bind(encode_time(&paper.updated_at))
        .execute(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn get_paper(&self, id: &str) -> Result<Option<Paper>, StoreError> {
        let row = sqlx::query("SELECT * FROM papers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(paper_from_row).transpose()
    }

    async fn list_papers(&self, faculty_id: &str) -> Result<Vec<Paper>, StoreError> {
        let rows = sqlx::query("SELECT * FROM papers WHERE faculty_id = ? ORDER BY created_at DESC")
            .bind(faculty_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(paper_from_row).collect()
    }

    async fn transition_paper_status(
        &self,
        id: &str,
        from: &[PaperStatus],
        to: PaperStatus,
    ) -> Result<bool, StoreError> {
        let from: Vec<&str> = from.iter().map(PaperStatus::as_str).collect();
        self.compare_and_set_status("papers", "status", id, &from, to.as_str())
            .await
    }

    async fn update_paper(&self, id: &str, update: PaperUpdate) -> Result<(), StoreError> {
        let now = encode_time(&Utc::now());
        let result = match &update.questions {
            Some(questions) => {
                sqlx::query(
                    "UPDATE papers SET status = ?, error = ?, questions = ?, updated_at = ? \
                     WHERE id = ?",
                )
                .bind(update.status.as_str())
                .bind(&update.error)
                .bind(encode_json("questions", questions)?)
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query("UPDATE papers SET status = ?, error = ?, updated_at = ? WHERE id = ?")
                    .bind(update.status.as_str())
                    .bind(&update.error)
                    .bind(&now)
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(query_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for SqliteStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        check_id(&subject.id)?;
        sqlx::query(
            "INSERT OR REPLACE INTO subjects (id, name, code, description, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&subject.id)
        .bind(&subject.name)
        .bind(&subject.code)
        .bind(&subject.description)
        .bind(encode_time(&subject.created_at))
        .execute(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn get_subject(&self, id: &str) -> Result<Option<Subject>, StoreError> {
        let row = sqlx::query("SELECT * FROM subjects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        row.as_ref().map(subject_from_row).transpose()
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let rows = sqlx::query("SELECT * FROM subjects ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(subject_from_row).collect()
    }
}
