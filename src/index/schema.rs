use serde_json::{json, Value};

/// Index body for regulatory resolution documents
pub fn regulatory_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "fuente": { "type": "keyword" },
                "numero_resolución": { "type": "text" },
                "fecha_resolución": { "type": "date", "format": "yyyy-MM-dd" },
                "nombre_proyecto": { "type": "text" },
                "ubicacion": { "type": "text" },
                "empresa": {
                    "type": "text",
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "empresa_normalizada": { "type": "keyword" },
                "numero_expediente": { "type": "keyword" },
                "radicados": { "type": "keyword" },
                "descripcion": { "type": "text" },
                "tipos_infraccion": { "type": "keyword" },
                "id_archivo": { "type": "keyword" },
                "nombre_archivo": { "type": "keyword" },
                "texto_completo": { "type": "text" }
            }
        }
    })
}
