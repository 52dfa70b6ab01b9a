//! Initial database migration.
//!
//! Creates all enums, tables, and indexes, including the partial unique
//! indexes that back the exactly-once posting guarantees.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: USERS & MASTER DATA
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PARTIES_SQL).await?;
        db.execute_unprepared(VEHICLE_TYPES_SQL).await?;
        db.execute_unprepared(WORK_TYPES_SQL).await?;

        // ============================================================
        // PART 3: WALLET LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(WALLET_TOPUPS_SQL).await?;

        // ============================================================
        // PART 4: APPROVAL WORKFLOWS
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(VOUCHERS_SQL).await?;

        // ============================================================
        // PART 5: EXTERNAL BOOKKEEPING
        // ============================================================
        db.execute_unprepared(TALLY_LOGS_SQL).await?;

        // ============================================================
        // PART 6: EQUIPMENT & RATES
        // ============================================================
        db.execute_unprepared(RATE_RULES_SQL).await?;
        db.execute_unprepared(USAGE_RECORDS_SQL).await?;

        // ============================================================
        // PART 7: AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('admin', 'manager', 'supervisor', 'accountant', 'office');
CREATE TYPE entry_direction AS ENUM ('credit', 'debit');
CREATE TYPE ledger_source_kind AS ENUM ('expense', 'voucher', 'topup', 'adjustment');
CREATE TYPE expense_status AS ENUM ('submitted', 'approved', 'rejected', 'finalized');
CREATE TYPE voucher_status AS ENUM ('submitted', 'approved', 'declined', 'logged');
CREATE TYPE contract_type AS ENUM ('fixed', 'shift', 'tonnes', 'hours');
CREATE TYPE usage_status AS ENUM ('running', 'completed');
CREATE TYPE tally_entry_kind AS ENUM ('expense', 'voucher', 'revenue', 'manual');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(150) NOT NULL UNIQUE,
    role user_role NOT NULL DEFAULT 'supervisor',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PARTIES_SQL: &str = r"
CREATE TABLE parties (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const VEHICLE_TYPES_SQL: &str = r"
CREATE TABLE vehicle_types (
    id UUID PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const WORK_TYPES_SQL: &str = r"
CREATE TABLE work_types (
    id UUID PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    seq BIGINT NOT NULL GENERATED ALWAYS AS IDENTITY,
    owner_id UUID NOT NULL REFERENCES users(id),
    direction entry_direction NOT NULL,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    source_kind ledger_source_kind NOT NULL,
    source_ref UUID,
    posted_by UUID NOT NULL REFERENCES users(id),
    description TEXT,
    balance_after NUMERIC(12, 2) NOT NULL,
    posted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_entries_owner_tail ON ledger_entries (owner_id, posted_at DESC, seq DESC);

-- Idempotency guard: at most one entry per (owner, source kind, source ref).
CREATE UNIQUE INDEX uq_ledger_entries_source
    ON ledger_entries (owner_id, source_kind, source_ref)
    WHERE source_ref IS NOT NULL;
";

const WALLET_TOPUPS_SQL: &str = r"
CREATE TABLE wallet_topups (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    payment_method VARCHAR(20) NOT NULL,
    reference_number VARCHAR(50),
    remarks TEXT,
    topped_up_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    expense_no BIGINT NOT NULL GENERATED ALWAYS AS IDENTITY,
    owner_id UUID NOT NULL REFERENCES users(id),
    date_time TIMESTAMPTZ NOT NULL,
    vehicle VARCHAR(50) NOT NULL,
    vehicle_number VARCHAR(20) NOT NULL,
    gate VARCHAR(20) NOT NULL,
    in_out VARCHAR(3) NOT NULL DEFAULT 'in',
    description TEXT NOT NULL,
    cisf_amount NUMERIC(12, 2) NOT NULL DEFAULT 50.00,
    kpt_amount NUMERIC(12, 2) NOT NULL DEFAULT 50.00,
    customs_amount NUMERIC(12, 2) NOT NULL DEFAULT 50.00,
    road_tax_days INTEGER NOT NULL DEFAULT 0 CHECK (road_tax_days >= 0),
    road_tax_amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    other_charges NUMERIC(12, 2) NOT NULL DEFAULT 0,
    total_amount NUMERIC(12, 2) NOT NULL,
    photo_ref VARCHAR(255),
    status expense_status NOT NULL DEFAULT 'submitted',
    reviewed_by UUID REFERENCES users(id),
    finalized_by UUID REFERENCES users(id),
    review_comments TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE UNIQUE INDEX uq_expenses_expense_no ON expenses (expense_no);
CREATE INDEX idx_expenses_owner_status ON expenses (owner_id, status);
CREATE INDEX idx_expenses_status ON expenses (status);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    date_time TIMESTAMPTZ NOT NULL,
    category VARCHAR(30) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    document_ref VARCHAR(255) NOT NULL,
    remarks TEXT,
    status voucher_status NOT NULL DEFAULT 'submitted',
    approved_by UUID REFERENCES users(id),
    logged_by UUID REFERENCES users(id),
    approval_comments TEXT,
    tally_reference VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_vouchers_owner_status ON vouchers (owner_id, status);
CREATE INDEX idx_vouchers_status ON vouchers (status);
";

const TALLY_LOGS_SQL: &str = r"
CREATE TABLE tally_logs (
    id UUID PRIMARY KEY,
    entry_kind tally_entry_kind NOT NULL,
    reference_id UUID,
    tally_voucher_number VARCHAR(50) NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    description TEXT NOT NULL,
    logged_by UUID NOT NULL REFERENCES users(id),
    logged_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Exactly one bookkeeping record per finalized expense / logged voucher.
CREATE UNIQUE INDEX uq_tally_logs_reference
    ON tally_logs (entry_kind, reference_id)
    WHERE reference_id IS NOT NULL;

CREATE INDEX idx_tally_logs_logged_at ON tally_logs (logged_at);
";

const RATE_RULES_SQL: &str = r"
CREATE TABLE rate_rules (
    id UUID PRIMARY KEY,
    party_id UUID NOT NULL REFERENCES parties(id),
    vehicle_type_id UUID NOT NULL REFERENCES vehicle_types(id),
    work_type_id UUID NOT NULL REFERENCES work_types(id),
    contract_type contract_type NOT NULL,
    rate NUMERIC(12, 2) NOT NULL CHECK (rate >= 0),
    effective_date DATE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (party_id, vehicle_type_id, work_type_id, contract_type, effective_date)
);
";

const USAGE_RECORDS_SQL: &str = r"
CREATE TABLE usage_records (
    id UUID PRIMARY KEY,
    party_id UUID NOT NULL REFERENCES parties(id),
    vehicle_type_id UUID NOT NULL REFERENCES vehicle_types(id),
    work_type_id UUID NOT NULL REFERENCES work_types(id),
    vehicle_number VARCHAR(20) NOT NULL,
    contract_type contract_type NOT NULL,
    start_time TIMESTAMPTZ NOT NULL,
    end_time TIMESTAMPTZ,
    duration_hours NUMERIC(10, 2),
    quantity NUMERIC(10, 2),
    rate NUMERIC(12, 2),
    total NUMERIC(12, 2),
    comments TEXT,
    status usage_status NOT NULL DEFAULT 'running',
    created_by UUID NOT NULL REFERENCES users(id),
    ended_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_usage_records_status ON usage_records (status);
CREATE INDEX idx_usage_records_party ON usage_records (party_id);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY,
    subject_kind VARCHAR(30) NOT NULL,
    subject_id UUID NOT NULL,
    action VARCHAR(20) NOT NULL,
    changes JSONB NOT NULL DEFAULT '{}',
    performed_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_logs_subject ON audit_logs (subject_kind, subject_id, created_at DESC);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS audit_logs;
DROP TABLE IF EXISTS usage_records;
DROP TABLE IF EXISTS rate_rules;
DROP TABLE IF EXISTS tally_logs;
DROP TABLE IF EXISTS vouchers;
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS wallet_topups;
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS work_types;
DROP TABLE IF EXISTS vehicle_types;
DROP TABLE IF EXISTS parties;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS tally_entry_kind;
DROP TYPE IF EXISTS usage_status;
DROP TYPE IF EXISTS contract_type;
DROP TYPE IF EXISTS voucher_status;
DROP TYPE IF EXISTS expense_status;
DROP TYPE IF EXISTS ledger_source_kind;
DROP TYPE IF EXISTS entry_direction;
DROP TYPE IF EXISTS user_role;
";
