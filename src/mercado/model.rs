use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// 服务端接受的 cnpj 样例
pub const VALID_CNPJ: &str = "12345678912345";

/// 长度不足 14 位的 cnpj
pub const INVALID_CNPJ: &str = "123456";

/// cnpj 必须的位数
pub const CNPJ_LEN: usize = 14;

pub const NOME_OBRIGATORIO: &str = "Nome é obrigatório";
pub const CNPJ_14_DIGITOS: &str = "CNPJ deve ter 14 dígitos";

/// 创建 / 更新 mercado 的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mercado {
    pub nome: String,
    pub cnpj: String,
    pub endereco: String,
}

impl Mercado {
    pub fn new(nome: impl Into<String>, cnpj: impl Into<String>, endereco: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            cnpj: cnpj.into(),
            endereco: endereco.into(),
        }
    }

    /// 带时间戳的合法 payload，避免多次运行之间重名
    pub fn unique(prefix: &str) -> Self {
        let stamp = Utc::now().timestamp_millis();
        Self::new(
            format!("Mercado {} {}", prefix, stamp),
            VALID_CNPJ,
            format!("Rua {} {}", prefix, stamp),
        )
    }

    pub fn with_cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj = cnpj.into();
        self
    }

    /// 指定长度的随机数字串
    pub fn random_cnpj(len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect()
    }

    pub fn has_valid_cnpj(&self) -> bool {
        self.cnpj.len() == CNPJ_LEN && self.cnpj.bytes().all(|b| b.is_ascii_digit())
    }
}

/// 校验失败时 `errors` 数组中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: String,
    pub path: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldError {
    /// body 字段上的错误
    pub fn field(msg: &str, path: &str) -> Self {
        Self {
            kind: "field".to_string(),
            msg: msg.to_string(),
            path: path.to_string(),
            location: "body".to_string(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

/// cnpj 位数不对时的完整错误 body
///
/// 服务端在这种情况下总是同时报告 nome 错误，顺序固定
pub fn invalid_cnpj_errors(cnpj: &str) -> Value {
    let errors = vec![
        FieldError::field(NOME_OBRIGATORIO, "nome"),
        FieldError::field(CNPJ_14_DIGITOS, "cnpj").with_value(cnpj),
    ];
    json!({ "errors": errors })
}

/// `/mercado/{id}/produtos/` 下的子资源：(名称, 路径)
pub const SUB_RESOURCES: [(&str, &str); 5] = [
    ("frutas", "hortifruit/frutas"),
    ("legumes", "hortifruit/legumes"),
    ("doces", "padaria/doces"),
    ("salgados", "padaria/salgados"),
    ("bovinos", "acougue/bovinos"),
];
