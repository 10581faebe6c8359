pub const SUBJECTS_TABLE: &str = "subjects";
pub const DOCUMENTS_TABLE: &str = "documents";
pub const CHUNKS_TABLE: &str = "document_chunks";
pub const PAPERS_TABLE: &str = "papers";
pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_SUBJECTS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS subjects (\
    id TEXT PRIMARY KEY,\
    name TEXT NOT NULL,\
    code TEXT NOT NULL,\
    description TEXT,\
    created_at TEXT NOT NULL\
)";

pub const CREATE_DOCUMENTS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS documents (\
    id TEXT PRIMARY KEY,\
    faculty_id TEXT NOT NULL,\
    subject_id TEXT NOT NULL,\
    unit_number INTEGER NOT NULL,\
    file_name TEXT,\
    file_path TEXT,\
    file_type TEXT,\
    extracted_text TEXT,\
    ocr_status TEXT NOT NULL DEFAULT 'none',\
    created_at TEXT NOT NULL,\
    updated_at TEXT NOT NULL\
)";

pub const CREATE_CHUNKS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS document_chunks (\
    id TEXT PRIMARY KEY,\
    document_id TEXT NOT NULL,\
    chunk_index INTEGER NOT NULL,\
    content TEXT NOT NULL,\
    subject_id TEXT NOT NULL,\
    unit_number INTEGER NOT NULL,\
    file_name TEXT,\
    embedding TEXT NOT NULL,\
    UNIQUE (document_id, chunk_index)\
)";

pub const CREATE_CHUNKS_SUBJECT_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_document_chunks_subject ON document_chunks (subject_id)";

pub const CREATE_PAPERS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS papers (\
    id TEXT PRIMARY KEY,\
    faculty_id TEXT NOT NULL,\
    subject_id TEXT NOT NULL,\
    title TEXT NOT NULL,\
    units TEXT NOT NULL,\
    difficulty TEXT NOT NULL,\
    custom_instructions TEXT,\
    question_config TEXT NOT NULL,\
    status TEXT NOT NULL DEFAULT 'draft',\
    questions TEXT NOT NULL,\
    error TEXT,\
    created_at TEXT NOT NULL,\
    updated_at TEXT NOT NULL\
)";

pub const CREATE_PAPERS_FACULTY_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_papers_faculty ON papers (faculty_id, created_at)";

pub const MIGRATION_STATEMENTS_SQL: [&str; 6] = [
    CREATE_SUBJECTS_TABLE_SQL,
    CREATE_DOCUMENTS_TABLE_SQL,
    CREATE_CHUNKS_TABLE_SQL,
    CREATE_CHUNKS_SUBJECT_INDEX_SQL,
    CREATE_PAPERS_TABLE_SQL,
    CREATE_PAPERS_FACULTY_INDEX_SQL,
];
