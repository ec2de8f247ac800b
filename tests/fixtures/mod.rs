//! Job message fixtures shared by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};

/// Category list sent with every fixture job.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("Atendimento", "Dúvidas, reclamações e suporte ao cliente"),
    ("Vendas", "Negociação, proposta comercial ou fechamento de contrato"),
    ("Financeiro", "Cobranças, boletos, reembolsos e pagamentos"),
];

pub const TRANSCRIPTION: &str =
    "Cliente: Olá, fui cobrado duas vezes na fatura deste mês e gostaria do reembolso.\n\
     Atendente: Claro, vou abrir a solicitação agora.";

/// A well-formed job message as JSON.
pub fn job_value(transcription_id: &str, status: &str) -> Value {
    let categories: Vec<Value> = CATEGORIES
        .iter()
        .map(|(name, description)| json!({"category": name, "description": description}))
        .collect();

    json!({
        "userId": "user-1",
        "squadId": "squad-7",
        "transcriptionId": transcription_id,
        "categories": categories,
        "transcription": TRANSCRIPTION,
        "duration": 184.2,
        "language": "pt-BR",
        "status": status,
    })
}

/// A well-formed job message body.
pub fn job_body(transcription_id: &str) -> String {
    job_value(transcription_id, "PENDING").to_string()
}

/// A reply in the exact shape the prompt asks for.
pub const GOOD_REPLY: &str =
    r#"{"title": "Reembolso de cobrança duplicada na fatura", "category": "Financeiro"}"#;
