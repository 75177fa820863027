//! Built-in taxonomy and alias table
//!
//! Product catalogue of the bank whose reviews the classification model was
//! fine-tuned on. Replace it with a taxonomy file for other catalogues.

use super::{AliasMap, Taxonomy, TopicNode};
use std::collections::HashMap;

const TOPICS: &[(&str, &[&str])] = &[
    ("Офисное обслуживание", &[]),
    ("Банкоматы", &[]),
    ("Дистанционное обслуживание", &[]),
    (
        "Дебетовые карты",
        &[
            "Денежные переводы",
            "Карта UnionPay",
            "Умная дебетовая карта «Мир»",
            "Премиальная карта Mir Supreme",
            "Карта для автолюбителей «Газпромбанк—Газпромнефть»",
            "Виртуальная дебетовая карта ГПБ&ФК «Зенит»",
            "Дебетовая Пенсионная карта",
        ],
    ),
    ("Курьерская доставка карт", &[]),
    ("Кредитные карты", &["Кредитная карта 180 дней Премиум"]),
    (
        "Вклады",
        &[
            "Вклад «Копить»",
            "Вклад «В Плюсе»",
            "Вклад «Новые деньги»",
            "Вклад «Ключевой момент»",
            "Вклад «Расширяй возможности»",
            "Социальный вклад",
        ],
    ),
    (
        "Кредиты",
        &[
            "Кредит наличными",
            "Кредит наличными под залог недвижимости",
            "Кредит под залог автомобиля",
            "Дачный кредит",
            "Кредит на образование",
            "Кредит наличными для бюджетников",
        ],
    ),
    ("Автокредиты", &[]),
    ("Страховые и сервисные продукты", &[]),
    (
        "Ипотека",
        &[
            "Ипотека для IT-специалистов",
            "Семейная ипотека",
            "Дальневосточная ипотека",
            "Ипотека на Новостройку",
        ],
    ),
    ("Мобильное приложение", &[]),
    (
        "Реструктуризация/Рефинансирование",
        &[
            "Рефинансирование кредитов",
            "Реструктуризация кредитов",
            "Рефинансирование ипотеки",
            "Реструктуризация ипотеки",
        ],
    ),
    (
        "Акции и бонусы",
        &[
            "Газпром Бонус",
            "Газпромбанк Привилегии",
            "Кэшбэк",
            "Акции",
            "Программы лояльности",
        ],
    ),
    (
        "Газпромбанк Премиум",
        &[
            "Персональный менеджер",
            "Консьерж-сервис",
            "Премиальное обслуживание",
            "Кредитная карта 180 дней Премиум",
            "Премиальная карта Mir Supreme",
            "Накопительный счёт «Премиум»",
        ],
    ),
    ("Обмен валют", &[]),
    (
        "Накопительные счета",
        &[
            "Накопительный счёт «Ежедневная выгода»",
            "Накопительный счёт «Ежедневный процент»",
            "Накопительный счёт «Премиум»",
            "Накопительный счёт Социальный счет",
        ],
    ),
    (
        "Другие услуги банка",
        &[
            "Газпромбанк Travel",
            "Gazprom Pay",
            "GorodPay",
            "Газпромбанк Инвестиции",
            "Инвестиционные продукты",
            "Брокерские услуги",
            "Депозитарные услуги",
            "Аренда сейфовых ячеек",
        ],
    ),
];

const ALIASES: &[(&str, &str)] = &[
    ("Обслуживание в банкоматах", "Банкоматы"),
    ("Обслуживание в банкомате", "Банкоматы"),
    ("Дебетовая карта «Мир»", "Умная дебетовая карта «Мир»"),
    ("UnionPay", "Карта UnionPay"),
    ("Карта Union Pay", "Карта UnionPay"),
    ("Карты UnionPay", "Карта UnionPay"),
    ("Программа приведи друга", "Программы лояльности"),
    ("Программа лояльности", "Программы лояльности"),
    ("Индивидуальный пенсионный план", "Инвестиционные продукты"),
    ("Кредитование", "Кредиты"),
    ("Потребительский кредит", "Кредиты"),
    ("Умная кредитная карта", "Кредитные карты"),
    ("Кредиты наличными", "Кредит наличными"),
    ("Акции банка", "Акции"),
    ("Брокерское обслуживание", "Брокерские услуги"),
    ("Накопительный счет", "Накопительные счета"),
    ("Накопительный счет «Премиум»", "Накопительный счёт «Премиум»"),
    ("Газпромбанк Мобайл", "Мобильное приложение"),
    ("Доставка карт", "Курьерская доставка карт"),
    ("Доставка карты", "Курьерская доставка карт"),
    ("Доставка продуктов", "Курьерская доставка карт"),
    ("«Премиум»", "Газпромбанк Премиум"),
    ("Подписка Премиум", "Газпромбанк Премиум"),
    ("Премиум", "Газпромбанк Премиум"),
    ("Программа привилегий", "Газпромбанк Привилегии"),
    ("Привилегии", "Газпромбанк Привилегии"),
    ("Дополнительные услуги", "Другие услуги банка"),
    ("Gazprom Pay (оплата телефоном)", "Gazprom Pay"),
    ("Газпромбанк Travel (покупка авиабилетов/отелей)", "Газпромбанк Travel"),
    ("GorodPay (оплата общественного транспорта)", "GorodPay"),
];

pub fn default_taxonomy() -> Taxonomy {
    let nodes = TOPICS
        .iter()
        .map(|(name, subtopics)| TopicNode::new(*name, subtopics))
        .collect();
    Taxonomy::new(nodes).expect("built-in taxonomy is valid")
}

pub fn default_aliases() -> AliasMap {
    AliasMap::new(
        ALIASES
            .iter()
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}
