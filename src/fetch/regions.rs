//! Canonical region names
//! Fixed English/Russian name pairs for the federal subjects of Russia.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// (canonical English name, provider Russian name)
pub const REGIONS: [(&str, &str); 85] = [
    ("Moscow", "Москва"),
    ("Saint Petersburg", "Санкт-Петербург"),
    ("Sevastopol", "Севастополь"),
    ("Moscow oblast", "Московская область"),
    ("Leningradskaya oblast", "Ленинградская область"),
    ("Republic of Adygeia", "Республика Адыгея"),
    ("Altai Republic", "Республика Алтай"),
    ("Altai Krai", "Алтайский край"),
    ("Amur oblast", "Амурская область"),
    ("Arkhangelsk oblast", "Архангельская область"),
    ("Astrakhan oblast", "Астраханская область"),
    ("Republic of Bashkortostan", "Республика Башкортостан"),
    ("Belgorod oblast", "Белгородская область"),
    ("Bryansk oblast", "Брянская область"),
    ("Republic of Buryatia", "Республика Бурятия"),
    ("Vladimir oblast", "Владимирская область"),
    ("Volgograd oblast", "Волгоградская область"),
    ("Vologda oblast", "Вологодская область"),
    ("Voronezh oblast", "Воронежская область"),
    ("Republic of Dagestan", "Республика Дагестан"),
    ("Jewish Autonomous oblast", "Еврейская автономная область"),
    ("Zabaykalsky Krai", "Забайкальский край"),
    ("Ivanovo oblast", "Ивановская область"),
    ("Republic of Ingushetia", "Республика Ингушетия"),
    ("Irkutsk oblast", "Иркутская область"),
    ("Kabardino-Balkarian Republic", "Кабардино-Балкарская Республика"),
    ("Kaliningrad oblast", "Калининградская область"),
    ("Republic of Kalmykia", "Республика Калмыкия"),
    ("Kaluga oblast", "Калужская область"),
    ("Kamchatka Krai", "Камчатский край"),
    ("Karachay-Cherkess Republic", "Карачаево-Черкесская Республика"),
    ("Republic of Karelia", "Республика Карелия"),
    ("Kemerovo oblast", "Кемеровская область"),
    ("Kirov oblast", "Кировская область"),
    ("Komi Republic", "Республика Коми"),
    ("Kostroma oblast", "Костромская область"),
    ("Krasnodar Krai", "Краснодарский край"),
    ("Krasnoyarsk Krai", "Красноярский край"),
    ("Republic of Crimea", "Республика Крым"),
    ("Kurgan oblast", "Курганская область"),
    ("Kursk oblast", "Курская область"),
    ("Lipetsk oblast", "Липецкая область"),
    ("Magadan oblast", "Магаданская область"),
    ("Mari El Republic", "Республика Марий Эл"),
    ("Republic of Mordovia", "Республика Мордовия"),
    ("Murmansk oblast", "Мурманская область"),
    ("Nenets Autonomous Okrug", "Ненецкий автономный округ"),
    ("Nizhny Novgorod oblast", "Нижегородская область"),
    ("Novgorod oblast", "Новгородская область"),
    ("Novosibirsk oblast", "Новосибирская область"),
    ("Omsk oblast", "Омская область"),
    ("Orenburg oblast", "Оренбургская область"),
    ("Orel oblast", "Орловская область"),
    ("Penza oblast", "Пензенская область"),
    ("Perm Krai", "Пермский край"),
    ("Primorsky Krai", "Приморский край"),
    ("Pskov oblast", "Псковская область"),
    ("Rostov oblast", "Ростовская область"),
    ("Ryazan oblast", "Рязанская область"),
    ("Samara oblast", "Самарская область"),
    ("Saratov oblast", "Саратовская область"),
    ("Sakha (Yakutiya) Republic", "Республика Саха (Якутия)"),
    ("Sakhalin oblast", "Сахалинская область"),
    ("Sverdlovsk oblast", "Свердловская область"),
    ("Republic of North Osetia - Alania", "Республика Северная Осетия — Алания"),
    ("Smolensk oblast", "Смоленская область"),
    ("Stavropol Krai", "Ставропольский край"),
    ("Tambov oblast", "Тамбовская область"),
    ("Republic of Tatarstan", "Республика Татарстан"),
    ("Tver oblast", "Тверская область"),
    ("Tomsk oblast", "Томская область"),
    ("Tula oblast", "Тульская область"),
    ("Republic of Tyva", "Республика Тыва"),
    ("Tyumen oblast", "Тюменская область"),
    ("Udmurt Republic", "Удмуртская Республика"),
    ("Ulyanovsk oblast", "Ульяновская область"),
    ("Khabarovsk Krai", "Хабаровский край"),
    ("Republic of Khakassia", "Республика Хакасия"),
    ("Khanty-Mansi Autonomous Okrug", "Ханты-Мансийский автономный округ — Югра"),
    ("Chelyabinsk oblast", "Челябинская область"),
    ("Chechen Republic", "Чеченская Республика"),
    ("Chuvashia Republic", "Чувашская Республика"),
    ("Chukotka Autonomous Okrug", "Чукотский автономный округ"),
    ("Yamalo-Nenets Autonomous Okrug", "Ямало-Ненецкий автономный округ"),
    ("Yaroslavl oblast", "Ярославская область"),
];

static RU_TO_EN: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| REGIONS.iter().map(|&(en, ru)| (ru, en)).collect());

static EN_TO_RU: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| REGIONS.iter().map(|&(en, ru)| (en, ru)).collect());

/// Canonical English name for a provider (Russian) region name.
pub fn to_english(ru: &str) -> Option<&'static str> {
    RU_TO_EN.get(ru).copied()
}

/// Provider (Russian) name for a canonical English region name.
pub fn to_russian(en: &str) -> Option<&'static str> {
    EN_TO_RU.get(en).copied()
}

/// What to do with provider region names missing from [`REGIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRegionMode {
    /// Fail on the first unmapped name.
    #[default]
    Strict,
    /// Skip unmapped names and report them.
    Lenient,
}
