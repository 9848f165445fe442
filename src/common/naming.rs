// src/common/naming.rs

// Tradução da convenção interna (snake_case, usada nas colunas e nos structs)
// para a externa (camelCase, usada no JSON da API).
// Os structs fazem isso via `#[serde(rename_all = "camelCase")]`; esta função
// cobre o que não passa pelo serde, como os nomes de campo nos erros de validação.

/// `next_follow_up_date` -> `nextFollowUpDate`
pub fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
