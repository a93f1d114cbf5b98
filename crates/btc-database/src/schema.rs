diesel::table! {
    use diesel::sql_types::*;

    bitcoin (date) {
        date -> Date,
        open -> Nullable<Double>,
        high -> Nullable<Double>,
        low -> Nullable<Double>,
        close -> Nullable<Double>,
        volume -> Nullable<Double>,
        marketcap -> Nullable<Double>,
    }
}
