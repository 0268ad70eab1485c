//! Prompt construction for the aggregate-sentiment classification.

use revsent_core::ProductStats;

use crate::types::ScoredReview;

/// Build the classification prompt for one product.
///
/// Pure: no I/O and no error path. A missing average score renders as `0.0`.
/// The model is asked for a single JSON object with exactly the keys
/// `sentiment`, `summary`, `positive_points` and `negative_points`.
#[must_use]
pub fn build_prompt(product_id: &str, stats: &ProductStats, reviews: &[ScoredReview]) -> String {
    let average = format_score(stats.average_score_or_zero());

    let review_lines = reviews
        .iter()
        .map(|review| {
            // Newlines inside a review would break the one-review-per-line layout.
            let text = review.text.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("- [Nota: {}] {text}", review.score)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\
Você é um especialista em análise de marketing e reviews de produtos. Sua tarefa é analisar um \
conjunto de avaliações de clientes para o produto {product_id}.

A nota média das avaliações deste produto é {average} (de 5).
Cada avaliação está acompanhada de sua respectiva nota (de 1 a 5). Considere tanto a nota média \
quanto o texto e a nota individual de cada avaliação para classificar o sentimento geral de forma \
equilibrada, refletindo a percepção real dos clientes.

Se a maioria das avaliações e a nota média forem positivas, classifique como \"Positivo\", mesmo \
que existam algumas reclamações negativas. Use \"Neutro\" apenas se houver um equilíbrio claro \
entre avaliações positivas e negativas, e explique no resumo que as experiências dos clientes foram \
divergentes. Considere não apenas a quantidade, mas também a gravidade dos problemas relatados: \
problemas de qualidade ou defeitos são mais graves do que atrasos na entrega.

Retorne um único objeto JSON com exatamente as seguintes chaves:

1. \"sentiment\": classifique como \"Positivo\", \"Negativo\" ou \"Neutro\".
2. \"summary\": um resumo conciso de uma ou duas frases que capture a opinião dos clientes e \
justifique a classificação, especialmente em casos de equilíbrio.
3. \"positive_points\": uma lista (array) de até 5 pontos positivos chave mencionados. Se nenhum \
for encontrado, retorne uma lista vazia [].
4. \"negative_points\": uma lista (array) de até 3 pontos negativos chave. Se nenhum for \
encontrado, retorne uma lista vazia [].

- A sua resposta deve ser APENAS o objeto JSON.
- Não inclua explicações, introduções, blocos de código ou a palavra \"json\" no início.
- Certifique-se de que o JSON esteja sintaticamente correto.

**Avaliações para Análise:**
{review_lines}

**JSON DE SAÍDA ESPERADO:**
"
    )
}

/// Integral averages keep one decimal (`4.0`), others print as stored (`4.25`).
fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
